//! Renderer output against the headless backend, using the bundled assets

use layered_diorama::backend::recording::{RecordedCall, RecordingBackend};
use layered_diorama::backend::{Bindings, TextureKind};
use layered_diorama::resources::{load_layer_textures, ShaderSources};
use layered_diorama::scene::{LayerId, Projection};
use layered_diorama::state::Background;
use layered_diorama::{ApplicationState, DioramaConfig, FramePlan, Renderer};
use std::path::PathBuf;
use winit::keyboard::KeyCode;

fn renderer() -> Renderer<RecordingBackend> {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let textures = load_layer_textures(&root.join("images")).unwrap();
    let shaders = ShaderSources::load(&root.join("shaders")).unwrap();
    Renderer::new(RecordingBackend::new(1280, 720), &shaders, &textures).unwrap()
}

#[test]
fn startup_uploads_quads_and_textures_once() {
    let r = renderer();
    let calls = r.backend().calls();

    let uploads = calls
        .iter()
        .filter(|c| {
            matches!(
                c,
                RecordedCall::CreateTexture { desc, uploaded: Some(_), .. }
                    if desc.kind == TextureKind::Sampled
            )
        })
        .count();
    assert_eq!(uploads, 6);

    let vertex_buffers = calls
        .iter()
        .filter(|c| {
            matches!(
                c,
                RecordedCall::CreateBuffer { label, size, .. }
                    if label.ends_with("_quad") && *size == 6 * 32
            )
        })
        .count();
    assert_eq!(vertex_buffers, 4);

    let pipelines = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::CreatePipeline { .. }))
        .count();
    assert_eq!(pipelines, 1);
}

#[test]
fn pipeline_receives_the_bundled_shader_text() {
    let r = renderer();
    let desc = r
        .backend()
        .calls()
        .iter()
        .find_map(|c| match c {
            RecordedCall::CreatePipeline { desc, .. } => Some(desc),
            _ => None,
        })
        .unwrap();
    assert!(desc.vertex_shader.contains("@vertex"));
    assert!(desc.fragment_shader.contains("@fragment"));
}

#[test]
fn frame_is_one_pass_between_begin_and_end() {
    let mut r = renderer();
    let state = ApplicationState::new(&DioramaConfig::default());
    let plan = FramePlan::build(&state, &Projection::default(), 1.0);

    r.backend_mut().clear_calls();
    r.render(&plan).unwrap();
    let calls = r.backend().calls();

    assert_eq!(calls.first(), Some(&RecordedCall::BeginFrame));
    assert_eq!(calls.last(), Some(&RecordedCall::EndFrame));
    assert_eq!(r.backend().passes().count(), 1);
    assert_eq!(r.backend().passes().next().unwrap().draws.len(), 6);
}

#[test]
fn draws_follow_layer_order_with_their_textures() {
    let mut r = renderer();
    let state = ApplicationState::new(&DioramaConfig::default());
    r.render(&FramePlan::build(&state, &Projection::default(), 0.0)).unwrap();

    let pass = r.backend().passes().last().unwrap().clone();
    for (layer, draw) in LayerId::DRAW_ORDER.iter().zip(&pass.draws) {
        let texture = r.layer_texture(*layer);
        assert_eq!(texture.name, layer.file_stem());
        match r.backend().bindings(draw.material) {
            Some(Bindings::Material { texture: bound, .. }) => assert_eq!(*bound, texture.handle),
            other => panic!("{:?} draws with {:?}", layer, other),
        }
    }
}

#[test]
fn background_toggle_reaches_the_clear_color() {
    let mut r = renderer();
    let mut state = ApplicationState::new(&DioramaConfig::default());

    state.on_key(KeyCode::KeyR, true);
    state.update(0.016);
    state.update(0.016);
    assert_eq!(state.background, Background::White);

    r.backend_mut().clear_calls();
    r.render(&FramePlan::build(&state, &Projection::default(), 0.0)).unwrap();
    assert_eq!(r.backend().passes().next().unwrap().clear_color, [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn viewport_follows_resize() {
    let mut r = renderer();
    r.resize(640, 480).unwrap();

    let state = ApplicationState::new(&DioramaConfig::default());
    r.backend_mut().clear_calls();
    r.render(&FramePlan::build(&state, &Projection::default(), 0.0)).unwrap();
    assert_eq!(r.backend().passes().next().unwrap().viewport, (640.0, 480.0));
}
