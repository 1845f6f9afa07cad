//! Model loading, per-anchor instances and material tuning

use anchorview_core::{MaterialSurface, ModelSlot};
use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::types::{AnchorRoot, ModelInstance, Placeholder, RetryLoadRequested, Session};

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelLoader>()
            .add_systems(Startup, start_model_load)
            .add_systems(PostStartup, spawn_placeholders)
            .add_systems(
                Update,
                (
                    retry_model_load,
                    poll_model_load,
                    spawn_model_instances,
                    tune_materials,
                )
                    .chain(),
            );
    }
}

/// The glTF being loaded and, once ready, its scene
#[derive(Resource, Default)]
pub struct ModelLoader {
    pub url: String,
    pub loading: Option<Handle<Gltf>>,
    pub scene: Option<Handle<Scene>>,
    /// Whether instances have been spawned for the current scene
    pub spawned: bool,
}

fn start_model_load(
    mut loader: ResMut<ModelLoader>,
    session: Res<Session>,
    asset_server: Res<AssetServer>,
) {
    let url = session.config().model.url.clone();
    tracing::info!(%url, "Loading model");
    loader.loading = Some(asset_server.load(url.clone()));
    loader.url = url;
}

fn retry_model_load(
    mut requests: MessageReader<RetryLoadRequested>,
    mut loader: ResMut<ModelLoader>,
    asset_server: Res<AssetServer>,
) {
    if requests.read().last().is_none() {
        return;
    }
    // A failed handle stays failed; ask the server to fetch the file again
    let url = loader.url.clone();
    let handle: Handle<Gltf> = asset_server.load(url.clone());
    asset_server.reload(url);
    loader.loading = Some(handle);
    loader.scene = None;
}

/// Check loading state and extract the scene from the loaded glTF
fn poll_model_load(
    mut loader: ResMut<ModelLoader>,
    mut session: ResMut<Session>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
) {
    let Some(handle) = loader.loading.clone() else {
        return;
    };

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let scene = gltf_assets
                .get(&handle)
                .and_then(|gltf| {
                    gltf.default_scene
                        .clone()
                        .or_else(|| gltf.scenes.first().cloned())
                });
            loader.loading = None;
            match scene {
                Some(scene) => {
                    tracing::info!(url = %loader.url, "Model loaded");
                    loader.scene = Some(scene);
                    loader.spawned = false;
                    session.model_loaded();
                }
                None => {
                    let url = loader.url.clone();
                    session.model_failed(url, "file contains no scene");
                }
            }
        }
        Some(LoadState::Failed(err)) => {
            loader.loading = None;
            let url = loader.url.clone();
            session.model_failed(url, err.to_string());
        }
        _ => {
            // Still loading
        }
    }
}

/// Placeholder cube on every anchor so tracking is visible before the model arrives
fn spawn_placeholders(
    mut commands: Commands,
    roots: Query<Entity, With<AnchorRoot>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Cuboid::new(0.5, 0.5, 0.5));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.0, 0.0),
        emissive: LinearRgba::rgb(1.0, 0.0, 0.0),
        ..default()
    });
    for root in roots.iter() {
        let cube = commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_xyz(0.0, 0.0, 0.5),
                Placeholder,
            ))
            .id();
        commands.entity(root).add_child(cube);
    }
}

/// Attach one model instance per synchronized object under its anchor root
fn spawn_model_instances(
    mut commands: Commands,
    mut loader: ResMut<ModelLoader>,
    session: Res<Session>,
    roots: Query<(Entity, &AnchorRoot)>,
    existing: Query<Entity, With<ModelInstance>>,
    placeholders: Query<Entity, With<Placeholder>>,
) {
    if loader.spawned || *session.model() != ModelSlot::Loaded {
        return;
    }
    let Some(scene) = loader.scene.clone() else {
        return;
    };

    for entity in existing.iter().chain(placeholders.iter()) {
        commands.entity(entity).despawn();
    }

    let bob = session.bob_offset();
    for object in session.objects() {
        let Some((root, _)) = roots.iter().find(|(_, r)| r.anchor == object.anchor()) else {
            tracing::warn!(anchor = %object.anchor(), "No root entity for anchor");
            continue;
        };
        let instance = commands
            .spawn((
                SceneRoot(scene.clone()),
                crate::types::instance_transform(&object.local, bob),
                ModelInstance { anchor: object.anchor() },
            ))
            .id();
        commands.entity(root).add_child(instance);
        tracing::debug!(anchor = %object.anchor(), "Spawned model instance");
    }
    loader.spawned = true;
}

/// PBR view of a Bevy standard material
struct StandardSurface<'a>(&'a mut StandardMaterial);

impl MaterialSurface for StandardSurface<'_> {
    fn supports_pbr(&self) -> bool {
        !self.0.unlit
    }

    fn set_pbr(&mut self, metallic: f32, roughness: f32) {
        self.0.metallic = metallic;
        self.0.perceptual_roughness = roughness;
    }
}

/// Tune the materials of meshes as the model's scene spawns them
fn tune_materials(
    session: Res<Session>,
    added: Query<
        (Entity, &MeshMaterial3d<StandardMaterial>),
        Added<MeshMaterial3d<StandardMaterial>>,
    >,
    parents: Query<&ChildOf>,
    instances: Query<(), With<ModelInstance>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let tuning = session.config().material;
    let mut meshes = 0;
    let mut tuned = 0;
    for (entity, material) in added.iter() {
        let in_model = parents
            .iter_ancestors(entity)
            .any(|ancestor| instances.contains(ancestor));
        if !in_model {
            continue;
        }
        meshes += 1;
        if let Some(mut material) = materials.get_mut(&material.0) {
            if tuning.apply(&mut StandardSurface(&mut material)) {
                tuned += 1;
            }
        }
    }
    if meshes > 0 {
        tracing::info!(meshes, tuned, "Found meshes in model");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorview_core::MaterialTuning;

    #[test]
    fn test_unlit_material_is_left_alone() {
        let mut material = StandardMaterial {
            unlit: true,
            metallic: 0.0,
            ..default()
        };
        assert!(!MaterialTuning::default().apply(&mut StandardSurface(&mut material)));
        assert_eq!(material.metallic, 0.0);
    }

    #[test]
    fn test_lit_material_gets_tuned() {
        let mut material = StandardMaterial::default();
        assert!(MaterialTuning::default().apply(&mut StandardSurface(&mut material)));
        assert_eq!(material.metallic, 0.3);
        assert_eq!(material.perceptual_roughness, 0.7);
    }
}
