//! Pipeline integration tests against the recording context

use approx::assert_relative_eq;

use crate::core::LessonConfig;
use crate::foundation::math::{mat3_to_array, mat4_to_array, top_left_3x3, MathError, Vec3, Vec4};
use crate::render::api::names;
use crate::render::{
    Camera, LessonPipeline, LightingMode, RecordingContext, RenderError, SurfacePoint,
    UniformValue,
};

const EPSILON: f32 = 1e-5;

fn pipeline(mode: LightingMode) -> (LessonPipeline, RecordingContext) {
    let mut ctx = RecordingContext::new();
    let pipeline = LessonPipeline::new(&LessonConfig::preset(mode), &mut ctx).unwrap();
    (pipeline, ctx)
}

fn mat4_uniform(ctx: &RecordingContext, name: &str) -> [f32; 16] {
    match ctx.last_uniform(name) {
        Some(UniformValue::Mat4(m)) => *m,
        other => panic!("{name}: expected mat4, got {other:?}"),
    }
}

#[test]
fn test_new_uploads_mesh_and_program() {
    let (pipeline, ctx) = pipeline(LightingMode::Unlit);
    assert_eq!(ctx.program_count(), 1);
    assert_eq!(ctx.mesh_count(), 1);
    assert_eq!(pipeline.frames_rendered(), 0);
    assert!(pipeline.last_frame().is_none());
}

#[test]
fn test_every_lesson_draws_once_per_frame() {
    for mode in LightingMode::ALL {
        let (mut pipeline, mut ctx) = pipeline(mode);
        for frame in 0..3 {
            pipeline
                .render_frame(f64::from(frame) * 16.0, &mut ctx)
                .unwrap_or_else(|e| panic!("{mode}: {e}"));
        }
        assert_eq!(ctx.draw_calls().len(), 3, "{mode}");
        assert!(ctx.draw_calls().iter().all(|d| d.mode == mode));
        assert_eq!(pipeline.frames_rendered(), 3);
    }
}

#[test]
fn test_model_changes_while_view_and_projection_stay_fixed() {
    let (mut pipeline, mut ctx) = pipeline(LightingMode::Lambert);
    pipeline.render_frame(0.0, &mut ctx).unwrap();
    pipeline.render_frame(1000.0, &mut ctx).unwrap();

    let draws = ctx.draw_calls();
    assert_ne!(draws[0].uniforms.get(names::MODEL), draws[1].uniforms.get(names::MODEL));
    assert_eq!(draws[0].uniforms.get(names::VIEW), draws[1].uniforms.get(names::VIEW));
    assert_eq!(
        draws[0].uniforms.get(names::PROJECTION),
        draws[1].uniforms.get(names::PROJECTION)
    );

    let expected = mat4_to_array(&pipeline.state().model_matrix(1000.0));
    assert_eq!(mat4_uniform(&ctx, names::MODEL), expected);
}

#[test]
fn test_view_is_inverse_camera_translation() {
    let (mut pipeline, mut ctx) = pipeline(LightingMode::Unlit);
    pipeline.render_frame(0.0, &mut ctx).unwrap();
    let view = mat4_uniform(&ctx, names::VIEW);
    // Column-major: translation lives in the last column
    assert_relative_eq!(view[12], 0.0);
    assert_relative_eq!(view[13], 0.0);
    assert_relative_eq!(view[14], -5.0);
}

#[test]
fn test_normal_matrix_of_spin_is_the_rotation() {
    let (mut pipeline, mut ctx) = pipeline(LightingMode::TransformedNormals);
    pipeline.render_frame(2500.0, &mut ctx).unwrap();

    let frame = *pipeline.last_frame().unwrap();
    let rotation = top_left_3x3(&frame.model);
    assert_relative_eq!(frame.normal_matrix, rotation, epsilon = EPSILON);

    let Some(UniformValue::Mat3(uploaded)) = ctx.last_uniform(names::NORMAL_MATRIX) else {
        panic!("normalMatrix missing");
    };
    assert_eq!(*uploaded, mat3_to_array(&frame.normal_matrix));
}

#[test]
fn test_failed_draw_skips_only_that_frame() {
    let (mut pipeline, mut ctx) = pipeline(LightingMode::BlinnPhong);
    pipeline.render_frame(0.0, &mut ctx).unwrap();

    ctx.fail_next_draw();
    let result = pipeline.render_frame(16.0, &mut ctx);
    assert!(matches!(result, Err(RenderError::ResourceUnavailable(_))));
    assert_eq!(pipeline.frames_rendered(), 1);

    pipeline.render_frame(32.0, &mut ctx).unwrap();
    assert_eq!(pipeline.frames_rendered(), 2);
    assert_eq!(ctx.draw_calls().len(), 2);
}

#[test]
fn test_light_edits_are_picked_up_next_frame() {
    let (mut pipeline, mut ctx) = pipeline(LightingMode::Lambert);
    pipeline.render_frame(0.0, &mut ctx).unwrap();

    pipeline.environment_mut().light_mut("sun").unwrap().direction = Vec3::zeros();
    assert!(matches!(
        pipeline.render_frame(16.0, &mut ctx),
        Err(RenderError::Math(MathError::DegenerateVector))
    ));

    pipeline.environment_mut().light_mut("sun").unwrap().direction = Vec3::new(0.0, 0.0, 3.0);
    pipeline.render_frame(32.0, &mut ctx).unwrap();
    assert_eq!(
        ctx.last_uniform(names::LIGHT_DIRECTION),
        Some(&UniformValue::Vec3([0.0, 0.0, 1.0]))
    );
}

#[test]
fn test_multi_light_uploads_every_point_light() {
    let (mut pipeline, mut ctx) = pipeline(LightingMode::MultiLight);
    pipeline.render_frame(0.0, &mut ctx).unwrap();
    assert_eq!(ctx.last_uniform(names::LIGHT_COUNT), Some(&UniformValue::Int(3)));
    let Some(UniformValue::FloatArray(positions)) = ctx.last_uniform(names::LIGHT_POSITION) else {
        panic!("lightPosition missing");
    };
    assert_eq!(positions.len(), 9);
    assert_eq!(&positions[0..3], &[3.0, 2.0, 3.0]);
}

#[test]
fn test_camera_move_updates_view() {
    let (mut pipeline, mut ctx) = pipeline(LightingMode::Unlit);
    let mut camera = Camera::default();
    camera.set_position(Vec3::new(1.0, 0.0, 10.0));
    pipeline.set_camera(&camera).unwrap();
    pipeline.render_frame(0.0, &mut ctx).unwrap();

    let view = mat4_uniform(&ctx, names::VIEW);
    assert_relative_eq!(view[12], -1.0);
    assert_relative_eq!(view[14], -10.0);
}

#[test]
fn test_shade_point_lambert_top_of_sphere() {
    let (pipeline, _ctx) = pipeline(LightingMode::Lambert);
    let top = SurfacePoint::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
    let color = pipeline.shade_point(0.0, &top).unwrap();

    let brightness = 1.0 / Vec3::new(0.2, 1.0, 0.5).norm();
    assert_relative_eq!(
        color,
        Vec4::new(0.8 * brightness, brightness, brightness, 1.0),
        epsilon = EPSILON
    );
}

#[test]
fn test_shade_point_normals_follow_the_spin() {
    let quarter_turn_ms = f64::from(std::f32::consts::FRAC_PI_2) / f64::from(0.0005_f32);
    let side = SurfacePoint::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));

    let (transformed, _) = pipeline(LightingMode::TransformedNormals);
    let color = transformed.shade_point(quarter_turn_ms, &side).unwrap();
    assert_relative_eq!(color, Vec4::new(0.5, 0.5, 0.0, 1.0), epsilon = EPSILON);

    let (raw, _) = pipeline(LightingMode::NormalVisualization);
    let color = raw.shade_point(quarter_turn_ms, &side).unwrap();
    assert_relative_eq!(color, Vec4::new(1.0, 0.5, 0.5, 1.0), epsilon = EPSILON);
}

#[test]
fn test_invalid_config_creates_nothing() {
    let mut config = LessonConfig::preset(LightingMode::Unlit);
    config.camera.near = 0.0;
    let mut ctx = RecordingContext::new();
    assert!(LessonPipeline::new(&config, &mut ctx).is_err());
    assert_eq!(ctx.program_count(), 0);
    assert_eq!(ctx.mesh_count(), 0);
}
