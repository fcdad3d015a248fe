//! The splash effect handle a host attaches, ticks and tears down.
//!
//! Lifecycle:
//!
//! 1. [`SplashApp::new`] loads the textures synchronously and prepares the
//!    material. Nothing is attached to the scene yet.
//! 2. [`SplashApp::activate`] starts the one-shot model load on a
//!    background thread.
//! 3. [`SplashApp::frame`] polls the load; once it resolves the instanced
//!    splash is built and its group attached to the scene. From then on
//!    every frame animates the instance pool.
//! 4. [`SplashApp::teardown`] cancels a pending load, detaches the group
//!    and drops the splash. A load that completes afterwards is ignored.

use std::sync::Arc;

use glam::Mat4;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    animation::FrameSummary,
    assets::{FileTextureLoader, GltfLoader, ModelLoader, PendingLoad, TextureLoader},
    error::SplashError,
    geometry::BaseGeometry,
    options::SplashOptions,
    scene::{Group, GroupId, SceneHost},
    splash::{Splash, SplashMaterial},
};

/// Name of the top-level group the app attaches.
pub const ROOT_GROUP: &str = "splash_root";
/// Name of the child group that tilts the effect into place.
pub const ORIENTATION_GROUP: &str = "splash_orientation";

/// Progress of the one-shot model load.
#[derive(Debug, Default)]
pub enum LoadState {
    /// [`SplashApp::activate`] has not been called.
    #[default]
    Idle,
    /// The model is loading in the background.
    Loading,
    /// The splash is built and attached.
    Ready,
    /// The load failed; the effect will never appear.
    Failed(SplashError),
    /// Torn down before or after the load resolved.
    Cancelled,
}

/// Owned state of one splash effect instance.
pub struct SplashApp {
    options: SplashOptions,
    model_loader: Arc<dyn ModelLoader>,
    material: SplashMaterial,
    rng: StdRng,
    pending: Option<PendingLoad<Arc<BaseGeometry>>>,
    state: LoadState,
    splash: Option<Splash>,
    group: Option<GroupId>,
    active: bool,
}

impl SplashApp {
    /// Create the effect with explicit loaders.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::OptionsParse`] if `options` fail validation.
    pub fn new(
        options: SplashOptions,
        model_loader: Arc<dyn ModelLoader>,
        texture_loader: &dyn TextureLoader,
    ) -> Result<Self, SplashError> {
        options.validate()?;
        let material = SplashMaterial::load(texture_loader, &options.assets);
        let rng = options
            .assets
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        Ok(Self {
            options,
            model_loader,
            material,
            rng,
            pending: None,
            state: LoadState::Idle,
            splash: None,
            group: None,
            active: true,
        })
    }

    /// Create the effect reading the model and textures from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::OptionsParse`] if `options` fail validation.
    pub fn from_files(options: SplashOptions) -> Result<Self, SplashError> {
        Self::new(options, Arc::new(GltfLoader), &FileTextureLoader)
    }

    /// Start loading the model. Only the first call has an effect.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::ThreadSpawn`] if the load thread cannot start.
    pub fn activate(&mut self) -> Result<(), SplashError> {
        if !self.active {
            log::warn!("splash was torn down; ignoring activation");
            return Ok(());
        }
        if !matches!(self.state, LoadState::Idle) {
            log::warn!("splash already activated; ignoring");
            return Ok(());
        }

        let loader = Arc::clone(&self.model_loader);
        let path = self.options.assets.model_path.clone();
        log::info!("loading splash model {path}");
        self.pending = Some(PendingLoad::spawn("splash-model-load", move || {
            let scene = loader.load_model(&path)?;
            log::debug!("{path}: {} scene nodes", scene.node_count());
            scene
                .first_mesh()
                .and_then(|node| node.mesh.clone())
                .ok_or(SplashError::NoMesh(path))
        })?);
        self.state = LoadState::Loading;
        Ok(())
    }

    /// Apply the load result if it has arrived. Returns `true` once the
    /// splash is attached.
    pub fn poll_load(&mut self, scene: &mut dyn SceneHost) -> bool {
        if let Some(result) = self.pending.as_mut().and_then(PendingLoad::poll) {
            self.pending = None;
            self.complete_load(result, scene);
        }
        self.splash.is_some()
    }

    /// Block until the model load resolves and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::AssetLoad`] if no load is pending, or a copy of
    /// the load's own error, unchanged in kind (the original is kept in
    /// [`load_state`](Self::load_state)).
    pub fn wait_for_load(&mut self, scene: &mut dyn SceneHost) -> Result<(), SplashError> {
        let Some(mut pending) = self.pending.take() else {
            return match &self.state {
                LoadState::Ready => Ok(()),
                LoadState::Failed(e) => Err(e.clone()),
                _ => Err(SplashError::AssetLoad("no model load in flight".to_owned())),
            };
        };
        let result = pending.wait();
        self.complete_load(result, scene);
        match &self.state {
            LoadState::Failed(e) => Err(e.clone()),
            _ => Ok(()),
        }
    }

    /// Per-frame callback. `timestamp_ms` is the host's frame clock.
    ///
    /// Returns `None` while there is nothing to animate.
    pub fn frame(&mut self, scene: &mut dyn SceneHost, timestamp_ms: f64) -> Option<FrameSummary> {
        let _ = self.poll_load(scene);
        let summary = self
            .splash
            .as_mut()
            .map(|splash| splash.tick(timestamp_ms, &mut self.rng));
        scene.update_matrix_world();
        summary
    }

    /// Detach from the scene and cancel any pending load.
    pub fn teardown(&mut self, scene: &mut dyn SceneHost) {
        self.active = false;
        if let Some(mut pending) = self.pending.take() {
            pending.cancel();
        }
        if let Some(id) = self.group.take() {
            let _ = scene.remove_group(id);
        }
        self.splash = None;
        self.state = LoadState::Cancelled;
    }

    /// The render object, once the model has loaded.
    #[must_use]
    pub fn splash(&self) -> Option<&Splash> {
        self.splash.as_ref()
    }

    /// Mutable render object, for the GPU upload step.
    pub fn splash_mut(&mut self) -> Option<&mut Splash> {
        self.splash.as_mut()
    }

    /// Current load progress.
    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    /// Options the app was created with.
    #[must_use]
    pub fn options(&self) -> &SplashOptions {
        &self.options
    }

    /// Whether [`teardown`](Self::teardown) has not been called yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// World matrix of the orientation group the splash hangs from.
    #[must_use]
    pub fn model_matrix(&self, scene: &dyn SceneHost) -> Option<Mat4> {
        let root = scene.group(self.group?)?;
        root.find(ORIENTATION_GROUP).map(Group::world_matrix)
    }

    fn complete_load(
        &mut self,
        result: Result<Arc<BaseGeometry>, SplashError>,
        scene: &mut dyn SceneHost,
    ) {
        if !self.active {
            log::debug!("splash torn down before its model loaded; discarding");
            return;
        }
        let built = result.and_then(|mesh| {
            Splash::new(&mesh, self.material.clone(), &self.options.animation)
        });
        match built {
            Ok(splash) => {
                let group = Group::new(ROOT_GROUP).with_child(
                    Group::new(ORIENTATION_GROUP)
                        .with_rotation_x(self.options.render.group_tilt_x),
                );
                self.group = Some(scene.add_group(group));
                scene.update_matrix_world();
                log::info!(
                    "splash ready: {} instances over {} vertices, {} indices",
                    splash.instance_count(),
                    splash.geometry().base().vertex_count(),
                    splash.geometry().base().index_count()
                );
                self.splash = Some(splash);
                self.state = LoadState::Ready;
            }
            Err(e) => {
                log::error!("splash model load failed: {e}");
                self.state = LoadState::Failed(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Condvar, Mutex};

    use super::*;
    use crate::{
        assets::{ModelNode, ModelScene},
        scene::SceneGraph,
    };

    struct NoTextures;

    impl TextureLoader for NoTextures {
        fn load_image(&self, path: &str) -> Result<image::RgbaImage, SplashError> {
            Err(SplashError::AssetLoad(path.to_owned()))
        }
    }

    struct Fixed(Result<(), &'static str>);

    impl ModelLoader for Fixed {
        fn load_model(&self, _path: &str) -> Result<ModelScene, SplashError> {
            self.0.map_err(|msg| SplashError::AssetLoad(msg.to_owned()))?;
            Ok(dome_scene())
        }
    }

    /// Blocks inside `load_model` until released.
    #[derive(Default)]
    struct Gated {
        open: Mutex<bool>,
        cv: Condvar,
    }

    impl Gated {
        fn release(&self) {
            *self.open.lock().unwrap() = true;
            self.cv.notify_all();
        }
    }

    impl ModelLoader for Gated {
        fn load_model(&self, _path: &str) -> Result<ModelScene, SplashError> {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.cv.wait(open).unwrap();
            }
            Ok(dome_scene())
        }
    }

    fn dome_scene() -> ModelScene {
        ModelScene {
            roots: vec![ModelNode {
                name: Some("dome".to_owned()),
                mesh: Some(Arc::new(BaseGeometry {
                    positions: Some(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
                    normals: Some(vec![[0.0, 0.0, 1.0]; 3]),
                    uvs: Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
                    indices: Some(vec![0, 1, 2]),
                })),
                children: Vec::new(),
            }],
        }
    }

    fn seeded() -> SplashOptions {
        let mut options = SplashOptions::default();
        options.assets.seed = Some(11);
        options
    }

    fn app(loader: Arc<dyn ModelLoader>) -> SplashApp {
        SplashApp::new(seeded(), loader, &NoTextures).unwrap()
    }

    #[test]
    fn nothing_happens_before_activation() {
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Fixed(Ok(()))));
        assert!(app.frame(&mut scene, 16.0).is_none());
        assert!(matches!(app.load_state(), LoadState::Idle));
        assert!(scene.is_empty());
    }

    #[test]
    fn load_attaches_tilted_group() {
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Fixed(Ok(()))));
        app.activate().unwrap();
        app.wait_for_load(&mut scene).unwrap();

        assert!(matches!(app.load_state(), LoadState::Ready));
        assert_eq!(app.splash().unwrap().instance_count(), 2);
        assert_eq!(scene.len(), 1);

        let model = app.model_matrix(&scene).unwrap();
        let expected = Mat4::from_rotation_x(-std::f32::consts::PI / 1.8);
        assert!(model.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn second_activation_is_ignored() {
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Fixed(Ok(()))));
        app.activate().unwrap();
        app.activate().unwrap();
        app.wait_for_load(&mut scene).unwrap();
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn failed_load_leaves_splash_unset() {
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Fixed(Err("unreachable host"))));
        app.activate().unwrap();
        assert!(app.wait_for_load(&mut scene).is_err());

        assert!(app.splash().is_none());
        assert!(matches!(app.load_state(), LoadState::Failed(_)));
        for t in 0..10 {
            assert!(app.frame(&mut scene, f64::from(t) * 16.0).is_none());
        }
        assert!(scene.is_empty());
    }

    #[test]
    fn meshless_model_is_a_failure() {
        struct Empty;
        impl ModelLoader for Empty {
            fn load_model(&self, _path: &str) -> Result<ModelScene, SplashError> {
                Ok(ModelScene::default())
            }
        }
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Empty));
        app.activate().unwrap();
        let err = app.wait_for_load(&mut scene).unwrap_err();
        assert!(matches!(err, SplashError::NoMesh(_)));
        assert!(matches!(app.load_state(), LoadState::Failed(SplashError::NoMesh(_))));
        assert!(matches!(app.wait_for_load(&mut scene), Err(SplashError::NoMesh(_))));
    }

    #[test]
    fn wait_returns_the_loader_error_kind() {
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Fixed(Err("bad header"))));
        app.activate().unwrap();
        match app.wait_for_load(&mut scene) {
            Err(SplashError::AssetLoad(msg)) => assert_eq!(msg, "bad header"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn activation_after_teardown_starts_nothing() {
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Fixed(Ok(()))));
        app.teardown(&mut scene);
        app.activate().unwrap();

        assert!(matches!(app.load_state(), LoadState::Cancelled));
        assert!(app.wait_for_load(&mut scene).is_err());
        assert!(app.frame(&mut scene, 16.0).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn frames_animate_after_load() {
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Fixed(Ok(()))));
        app.activate().unwrap();
        app.wait_for_load(&mut scene).unwrap();

        let first = app.frame(&mut scene, 0.0).unwrap();
        assert_eq!(first.reseeded, 2);
        let second = app.frame(&mut scene, 16.0).unwrap();
        assert_eq!(second.reseeded, 0);
        assert!((app.splash().unwrap().material().time - 0.016).abs() < 1e-6);
    }

    #[test]
    fn teardown_before_load_discards_result() {
        let gate = Arc::new(Gated::default());
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::clone(&gate) as Arc<dyn ModelLoader>);
        app.activate().unwrap();
        assert!(matches!(app.load_state(), LoadState::Loading));

        app.teardown(&mut scene);
        gate.release();
        std::thread::sleep(std::time::Duration::from_millis(20));

        assert!(app.frame(&mut scene, 16.0).is_none());
        assert!(!app.poll_load(&mut scene));
        assert!(app.splash().is_none());
        assert!(scene.is_empty());
        assert!(matches!(app.load_state(), LoadState::Cancelled));
    }

    #[test]
    fn teardown_after_load_detaches_group() {
        let mut scene = SceneGraph::new();
        let mut app = app(Arc::new(Fixed(Ok(()))));
        app.activate().unwrap();
        app.wait_for_load(&mut scene).unwrap();
        assert_eq!(scene.len(), 1);

        app.teardown(&mut scene);
        assert!(scene.is_empty());
        assert!(app.splash().is_none());
        assert!(!app.is_active());
        assert!(app.model_matrix(&scene).is_none());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mut options = seeded();
        options.animation.fade_step = 0.0;
        assert!(SplashApp::new(options, Arc::new(Fixed(Ok(()))), &NoTextures).is_err());
    }
}
