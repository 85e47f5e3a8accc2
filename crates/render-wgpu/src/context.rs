use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuInitError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Adapter requests tried in order until one succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterAttempt {
    Hardware,
    /// Software or otherwise reduced-capability adapter.
    Fallback,
}

impl AdapterAttempt {
    pub const ORDER: [AdapterAttempt; 2] = [AdapterAttempt::Hardware, AdapterAttempt::Fallback];

    pub fn name(self) -> &'static str {
        match self {
            AdapterAttempt::Hardware => "hardware",
            AdapterAttempt::Fallback => "fallback",
        }
    }

    pub fn next(self) -> Option<AdapterAttempt> {
        match self {
            AdapterAttempt::Hardware => Some(AdapterAttempt::Fallback),
            AdapterAttempt::Fallback => None,
        }
    }

    pub fn power_preference(self) -> wgpu::PowerPreference {
        match self {
            AdapterAttempt::Hardware => wgpu::PowerPreference::HighPerformance,
            AdapterAttempt::Fallback => wgpu::PowerPreference::LowPower,
        }
    }

    pub fn force_fallback_adapter(self) -> bool {
        self == AdapterAttempt::Fallback
    }

    pub fn options<'a, 'w>(
        self,
        surface: &'a wgpu::Surface<'w>,
    ) -> wgpu::RequestAdapterOptions<'a, 'w> {
        wgpu::RequestAdapterOptions {
            power_preference: self.power_preference(),
            compatible_surface: Some(surface),
            force_fallback_adapter: self.force_fallback_adapter(),
        }
    }
}

/// Device, queue and configured surface for one window.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Acquire a GPU for `target` and configure its surface.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let mut adapter = None;
        for attempt in AdapterAttempt::ORDER {
            adapter = instance.request_adapter(&attempt.options(&surface)).await;
            if adapter.is_some() {
                break;
            }
            if let Some(next) = attempt.next() {
                tracing::warn!(
                    "no {} adapter, falling back on {}",
                    attempt.name(),
                    next.name()
                );
            }
        }
        let adapter = adapter.ok_or(GpuInitError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("flyview_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuInitError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let adapter_info = adapter.get_info();
        tracing::info!(
            backend = adapter_info.backend.to_str(),
            adapter = %adapter_info.name,
            format = ?surface_format,
            "GPU initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            adapter_info,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface. Zero sizes are clamped to one pixel.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    /// Reapply the current configuration after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_tried_after_hardware() {
        assert_eq!(
            AdapterAttempt::ORDER,
            [AdapterAttempt::Hardware, AdapterAttempt::Fallback]
        );
        assert_eq!(
            AdapterAttempt::Hardware.next(),
            Some(AdapterAttempt::Fallback)
        );
        assert_eq!(AdapterAttempt::Fallback.next(), None);
    }

    #[test]
    fn only_the_second_attempt_forces_software() {
        assert!(!AdapterAttempt::Hardware.force_fallback_adapter());
        assert!(AdapterAttempt::Fallback.force_fallback_adapter());
        assert_eq!(
            AdapterAttempt::Hardware.power_preference(),
            wgpu::PowerPreference::HighPerformance
        );
    }
}
