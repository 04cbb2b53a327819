use lumen_common::Rotation;

use crate::environment::EnvironmentMap;
use crate::model::Model;

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A model was attached. Carries its triangle count.
    ModelAttached { triangles: usize },
    /// An environment map was assigned.
    EnvironmentAssigned { width: u32, height: u32 },
    /// The model rotation changed.
    ModelRotated { old: Rotation, new: Rotation },
}

/// The scene: zero or one model plus optional environment lighting.
///
/// The environment lights and reflects; it is never drawn as a background.
/// Both slots are filled at most once. Revisions let render backends notice
/// new content without diffing.
#[derive(Debug, Default)]
pub struct Scene {
    model: Option<Model>,
    environment: Option<EnvironmentMap>,
    model_revision: u64,
    environment_revision: u64,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.environment.as_ref()
    }

    /// Bumped each time a model is attached.
    pub fn model_revision(&self) -> u64 {
        self.model_revision
    }

    /// Bumped each time an environment is assigned.
    pub fn environment_revision(&self) -> u64 {
        self.environment_revision
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Attach the model. Returns false (and keeps the current one) if a model
    /// is already present.
    pub fn add_model(&mut self, model: Model) -> bool {
        if self.model.is_some() {
            tracing::warn!("scene already holds a model; ignoring new one");
            return false;
        }
        let triangles = model.triangle_count();
        self.model = Some(model);
        self.model_revision += 1;
        self.event_log.push(SceneEvent::ModelAttached { triangles });
        true
    }

    /// Assign the environment map. Returns false if one is already assigned.
    pub fn set_environment(&mut self, environment: EnvironmentMap) -> bool {
        if self.environment.is_some() {
            tracing::warn!("scene environment already assigned; ignoring new one");
            return false;
        }
        self.event_log.push(SceneEvent::EnvironmentAssigned {
            width: environment.width,
            height: environment.height,
        });
        self.environment = Some(environment);
        self.environment_revision += 1;
        true
    }

    /// Replace the model rotation. Returns false when there is no model.
    ///
    /// Consecutive rotations collapse into one log entry that keeps the
    /// earliest `old`, so pointer motion never grows the log.
    pub fn set_model_rotation(&mut self, new: Rotation) -> bool {
        let Some(model) = self.model.as_mut() else {
            return false;
        };
        let old = model.rotation;
        model.rotation = new;
        match self.event_log.last_mut() {
            Some(SceneEvent::ModelRotated { new: latest, .. }) => *latest = new,
            _ => self.event_log.push(SceneEvent::ModelRotated { old, new }),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Mapping;

    #[test]
    fn scene_starts_empty() {
        let scene = Scene::new();
        assert!(scene.model().is_none());
        assert!(scene.environment().is_none());
        assert!(scene.events().is_empty());
        assert_eq!(scene.model_revision(), 0);
    }

    #[test]
    fn rotation_without_model_is_rejected() {
        let mut scene = Scene::new();
        assert!(!scene.set_model_rotation(Rotation::new(0.1, 0.2)));
        assert!(scene.events().is_empty());
    }

    #[test]
    fn add_model_then_rotate() {
        let mut scene = Scene::new();
        assert!(scene.add_model(Model::default()));
        assert_eq!(scene.model_revision(), 1);

        let r = Rotation::new(0.1, -0.2);
        assert!(scene.set_model_rotation(r));
        assert_eq!(scene.model().unwrap().rotation, r);
        assert_eq!(
            scene.events(),
            &[
                SceneEvent::ModelAttached { triangles: 0 },
                SceneEvent::ModelRotated {
                    old: Rotation::ZERO,
                    new: r
                },
            ]
        );
    }

    #[test]
    fn second_model_is_ignored() {
        let mut scene = Scene::new();
        assert!(scene.add_model(Model {
            name: Some("first".into()),
            ..Model::default()
        }));
        assert!(!scene.add_model(Model {
            name: Some("second".into()),
            ..Model::default()
        }));
        assert_eq!(scene.model().unwrap().name.as_deref(), Some("first"));
        assert_eq!(scene.model_revision(), 1);
    }

    #[test]
    fn environment_assigned_once() {
        let mut scene = Scene::new();
        let mut env = EnvironmentMap::new(1, 1, vec![0.5, 0.5, 0.5, 1.0]);
        env.mapping = Mapping::EquirectangularReflection;
        assert!(scene.set_environment(env.clone()));
        assert!(!scene.set_environment(env));
        assert_eq!(scene.environment_revision(), 1);
        assert_eq!(
            scene.environment().unwrap().mapping,
            Mapping::EquirectangularReflection
        );
    }

    #[test]
    fn consecutive_rotations_share_one_entry() {
        let mut scene = Scene::new();
        scene.add_model(Model::default());
        for i in 0..10_000 {
            scene.set_model_rotation(Rotation::new(i as f32 * 1e-4, 0.0));
        }
        let last = Rotation::new(9_999.0 * 1e-4, 0.0);
        assert_eq!(
            scene.events(),
            &[
                SceneEvent::ModelAttached { triangles: 0 },
                SceneEvent::ModelRotated {
                    old: Rotation::ZERO,
                    new: last
                },
            ]
        );
    }

    #[test]
    fn rotation_after_other_event_starts_new_entry() {
        let mut scene = Scene::new();
        scene.add_model(Model::default());
        let first = Rotation::new(0.1, 0.1);
        let second = Rotation::new(0.2, 0.2);
        scene.set_model_rotation(first);
        scene.set_environment(EnvironmentMap::new(1, 1, vec![0.0; 4]));
        scene.set_model_rotation(second);

        let events = scene.events();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[3],
            SceneEvent::ModelRotated {
                old: first,
                new: second
            }
        );
    }

    #[test]
    fn drain_events_clears_log() {
        let mut scene = Scene::new();
        scene.add_model(Model::default());
        assert_eq!(scene.drain_events().len(), 1);
        assert!(scene.events().is_empty());
    }
}
