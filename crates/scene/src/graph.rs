use flyview_assets::LoadedModel;
use flyview_common::{Aabb, LightingConfig, PlacementConfig, Transform};
use glam::{Mat4, Vec3};
use std::sync::Arc;

/// Index of a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    /// Color premultiplied by intensity.
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    AmbientLight(Light),
    /// Shines from the node's world position toward the origin.
    DirectionalLight(Light),
    Model(Arc<LoadedModel>),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown scene node {0}")]
    UnknownNode(NodeId),
    #[error("a model is already attached at node {0}")]
    ModelAlreadyAttached(NodeId),
}

/// Arena-backed scene graph rooted at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    board: Option<NodeId>,
    model: Option<NodeId>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// A graph holding only the root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: "root".into(),
                transform: Transform::default(),
                kind: NodeKind::Group,
                parent: None,
                children: Vec::new(),
            }],
            board: None,
            model: None,
        }
    }

    /// A graph with the ambient and directional lights from `lighting`.
    pub fn with_lighting(lighting: &LightingConfig) -> Self {
        let mut scene = Self::new();
        scene.push(
            NodeId::ROOT,
            "ambient_light",
            Transform::default(),
            NodeKind::AmbientLight(Light {
                color: lighting.ambient_color,
                intensity: lighting.ambient_intensity,
            }),
        );
        scene.push(
            NodeId::ROOT,
            "directional_light",
            Transform {
                position: lighting.directional_position.normalize_or_zero(),
                ..Transform::default()
            },
            NodeKind::DirectionalLight(Light {
                color: lighting.directional_color,
                intensity: lighting.directional_intensity,
            }),
        );
        scene
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists.
        false
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Add a node under `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        if self.node(parent).is_none() {
            return Err(SceneError::UnknownNode(parent));
        }
        Ok(self.push(parent, name, transform, kind))
    }

    fn push(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            transform,
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Node-to-world matrix, composed from the root down.
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.node(id)?;
        let mut matrix = node.transform.to_matrix();
        while let Some(parent) = node.parent {
            node = &self.nodes[parent.0];
            matrix = node.transform.to_matrix() * matrix;
        }
        Some(matrix)
    }

    /// Attach the loaded model under a new board node.
    ///
    /// The model's bounding-box center is computed but the fixed `placement`
    /// decides where it ends up. A second call is rejected so the model is
    /// never duplicated.
    pub fn attach_model(
        &mut self,
        model: LoadedModel,
        placement: &PlacementConfig,
    ) -> Result<NodeId, SceneError> {
        if let Some(existing) = self.model {
            return Err(SceneError::ModelAlreadyAttached(existing));
        }

        let center = model.bounds().as_ref().map(Aabb::center);
        tracing::debug!(model = %model.name, ?center, position = ?placement.position, "placing model");

        let board = match self.board {
            Some(board) => board,
            None => {
                let board = self.push(NodeId::ROOT, "board", Transform::default(), NodeKind::Group);
                self.board = Some(board);
                board
            }
        };
        let name = model.name.clone();
        let id = self.push(
            board,
            name,
            Transform::from_position_scale(placement.position, placement.scale),
            NodeKind::Model(Arc::new(model)),
        );
        self.model = Some(id);
        tracing::info!(node = %id, "model attached to scene");
        Ok(id)
    }

    pub fn board(&self) -> Option<NodeId> {
        self.board
    }

    pub fn model_node(&self) -> Option<NodeId> {
        self.model
    }

    /// Every model node with its world matrix.
    pub fn models(&self) -> impl Iterator<Item = (NodeId, &LoadedModel, Mat4)> {
        self.iter().filter_map(|(id, node)| match &node.kind {
            NodeKind::Model(model) => {
                let world = self.world_transform(id)?;
                Some((id, model.as_ref(), world))
            }
            _ => None,
        })
    }

    /// Sum of all ambient lights.
    pub fn ambient(&self) -> Vec3 {
        self.nodes
            .iter()
            .filter_map(|n| match n.kind {
                NodeKind::AmbientLight(light) => Some(light.radiance()),
                _ => None,
            })
            .sum()
    }

    /// First directional light: unit vector toward the light, and its radiance.
    pub fn directional(&self) -> Option<(Vec3, Vec3)> {
        self.iter().find_map(|(id, node)| match node.kind {
            NodeKind::DirectionalLight(light) => {
                let world = self.world_transform(id)?;
                let toward = world.transform_point3(Vec3::ZERO).normalize_or_zero();
                Some((toward, light.radiance()))
            }
            _ => None,
        })
    }

    /// World-space bounds of the attached model.
    pub fn model_bounds(&self) -> Option<Aabb> {
        let id = self.model?;
        let node = self.node(id)?;
        let NodeKind::Model(model) = &node.kind else {
            return None;
        };
        Some(model.bounds()?.transformed(&self.world_transform(id)?))
    }
}
