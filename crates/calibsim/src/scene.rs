//! The standard calibration scene: a line of targets and one camera.

use calibsim_core::{
    CameraParameters, EntityId, Interaction, InteractionEvent, Outcome, Pose, Registry,
    Result, SceneError, SceneObserver,
};
use calibsim_entities::{
    default_camera_orientation, make_line_of_targets, target_name, Camera, Capture,
    LineOfTargets, Target,
};

use crate::config::SceneConfig;

/// What [`Scene::run_pending`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Events that were applied, in arrival order.
    pub applied: Vec<(EntityId, Outcome)>,
    /// One capture per camera trigger.
    pub captures: Vec<Capture>,
}

/// A live scene of fiducial targets and a single camera proxy.
///
/// The scene owns its [`Registry`]. Dropping the scene or calling
/// [`Scene::shutdown`] closes it.
pub struct Scene {
    registry: Registry,
    frame_id: String,
    targets: Vec<EntityId>,
    camera: EntityId,
}

impl Scene {
    /// Builds the scene without observers.
    pub fn build(config: &SceneConfig) -> Result<Self> {
        Self::build_with_observers(config, Vec::new())
    }

    /// Builds the scene and publishes it to `observers` as a single commit.
    ///
    /// The camera parameters are validated before any entity is created, so
    /// a bad camera configuration never leaves a half-built scene behind.
    pub fn build_with_observers(
        config: &SceneConfig,
        observers: Vec<Box<dyn SceneObserver>>,
    ) -> Result<Self> {
        let params = CameraParameters::from_raw(&config.camera)?;

        let mut registry = Registry::open();
        for observer in observers {
            registry.add_observer(observer);
        }

        let line = LineOfTargets::new(
            config.world_frame_id.clone(),
            config.num_targets_in_line,
            config.distance_between_targets,
        )
        .with_start(
            config.starting_target_position,
            config.starting_target_orientation,
        )
        .with_colors(config.origin_color, config.regular_color)
        .with_scale(config.target_scale);
        let targets = make_line_of_targets(&mut registry, &line)?;

        let configured = config.starting_camera_orientation;
        let orientation = default_camera_orientation();
        log::info!(
            "camera orientation: {} {} {} {} (configured {} {} {} {} ignored)",
            orientation.x,
            orientation.y,
            orientation.z,
            orientation.w,
            configured.x,
            configured.y,
            configured.z,
            configured.w
        );
        let camera = Camera::new(
            config.world_frame_id.clone(),
            Camera::DEFAULT_NAME,
            Pose::new(config.starting_camera_position, orientation),
            config.camera_color,
            config.camera_scale,
            params,
        )?;
        let camera = registry.register(Box::new(camera))?;

        registry.apply_changes()?;
        log::info!(
            "scene ready: {} target(s) and camera '{}' in '{}'",
            targets.len(),
            config.camera.camera_name,
            config.world_frame_id
        );

        Ok(Self {
            registry,
            frame_id: config.world_frame_id.clone(),
            targets,
            camera,
        })
    }

    /// Returns the registry backing this scene.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns whether the scene still accepts events.
    pub fn is_live(&self) -> bool {
        self.registry.is_open()
    }

    /// Returns the reference frame of the scene.
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Returns the ids of the targets created at start-up.
    pub fn target_ids(&self) -> &[EntityId] {
        &self.targets
    }

    /// Returns the id of the camera.
    pub fn camera_id(&self) -> EntityId {
        self.camera
    }

    /// Returns the camera, or `None` after shutdown.
    pub fn camera(&self) -> Option<&Camera> {
        self.registry.get_as::<Camera>(self.camera)
    }

    /// Returns target `index`, or `None` if it does not exist.
    pub fn target(&self, index: u32) -> Option<&Target> {
        let id = self.registry.lookup(&self.frame_id, &target_name(index))?;
        self.registry.get_as::<Target>(id)
    }

    /// Returns every live target in registration order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.registry
            .iter_of_type(Target::TYPE_NAME)
            .filter_map(|(_, e)| e.as_any().downcast_ref::<Target>())
    }

    /// Queues an interaction event.
    pub fn submit(&mut self, event: InteractionEvent) -> Result<()> {
        self.registry.submit(event)
    }

    /// Queues an interaction for the entity called `name` in the scene frame.
    pub fn submit_by_name(&mut self, name: &str, interaction: Interaction) -> Result<()> {
        let id = self
            .registry
            .lookup(&self.frame_id, name)
            .ok_or_else(|| SceneError::EntityNotFound(name.to_string()))?;
        self.submit(InteractionEvent::new(id, interaction))
    }

    /// Applies a single event immediately.
    pub fn dispatch(&mut self, event: &InteractionEvent) -> Result<Outcome> {
        self.registry.dispatch(event)
    }

    /// Applies every queued event and captures an image per camera click.
    ///
    /// Events are applied in arrival order; a capture sees the scene as it
    /// was when the camera was clicked. Rejected events are logged and
    /// skipped.
    pub fn run_pending(&mut self) -> Result<RunReport> {
        if !self.is_live() {
            return Err(SceneError::RegistryClosed);
        }
        let mut report = RunReport::default();
        while let Some(event) = self.registry.next_event() {
            match self.registry.dispatch(&event) {
                Ok(outcome) => {
                    if event.entity == self.camera && outcome == Outcome::Triggered {
                        report.captures.push(self.capture()?);
                    }
                    report.applied.push((event.entity, outcome));
                }
                Err(err) => log::warn!("dropping {} event: {err}", event.interaction.label()),
            }
        }
        Ok(report)
    }

    /// Images every target through the camera.
    pub fn capture(&self) -> Result<Capture> {
        let camera = self.camera().ok_or(SceneError::RegistryClosed)?;
        let capture = camera.capture(self.targets());
        log::info!(
            "'{}' sees {} of {} target(s)",
            camera.params().camera_name,
            capture.detections.len(),
            capture.detections.len() + capture.rejections.len()
        );
        Ok(capture)
    }

    /// Closes the scene. No event is delivered afterwards.
    pub fn shutdown(&mut self) {
        self.registry.close();
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.shutdown();
    }
}
