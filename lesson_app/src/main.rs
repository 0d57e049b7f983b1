//! Rabbit lighting lessons
//!
//! Runs one lesson headless against the recording context and reports what
//! was drawn.
//!
//! ```text
//! rabbit_lessons [LESSON | CONFIG.toml | CONFIG.ron] [FRAMES] [--set TARGET.PARAM=VALUE]...
//! ```
//!
//! `TARGET` is `material` or the name of a light, e.g.
//! `--set sun.direction.x=0.5` or `--set material.specular_shininess=64`.

use lighting_engine::debug::{light_direction_panel, material_panel, point_light_panel, ParameterPanel};
use lighting_engine::foundation::logging;
use lighting_engine::prelude::*;
use thiserror::Error;

const DEFAULT_LESSON: &str = "blinn-phong";
const DEFAULT_FRAMES: u64 = 600;
const MAX_CONSECUTIVE_FAILURES: u32 = 60;

/// Application-level errors
#[derive(Error, Debug)]
enum AppError {
    /// Bad command line
    #[error("{0}\n\n{}", USAGE)]
    Usage(String),

    /// Lesson configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rejected parameter
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Pipeline or frame error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Frame loop error
    #[error(transparent)]
    Engine(#[from] EngineError),
}

const USAGE: &str = "usage: rabbit_lessons [LESSON | CONFIG.toml | CONFIG.ron] [FRAMES] [--set TARGET.PARAM=VALUE]...
lessons: unlit, normals, transformed-normals, lambert, blinn-phong, multi-light";

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    source: Option<String>,
    frames: Option<u64>,
    edits: Vec<Edit>,
}

/// One `--set` argument
#[derive(Debug, Clone, PartialEq)]
struct Edit {
    target: String,
    parameter: String,
    value: f32,
}

impl Edit {
    fn parse(arg: &str) -> Result<Self, AppError> {
        let invalid = || AppError::Usage(format!("invalid --set argument '{arg}'"));
        let (path, value) = arg.split_once('=').ok_or_else(invalid)?;
        let (target, parameter) = path.split_once('.').ok_or_else(invalid)?;
        let value = value.trim().parse().map_err(|_| invalid())?;
        Ok(Self {
            target: target.to_string(),
            parameter: parameter.to_string(),
            value,
        })
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, AppError> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(AppError::Usage("help requested".to_string())),
            "--set" => {
                let edit = args
                    .next()
                    .ok_or_else(|| AppError::Usage("--set needs an argument".to_string()))?;
                options.edits.push(Edit::parse(&edit)?);
            }
            _ if options.source.is_none() && arg.parse::<u64>().is_err() => {
                options.source = Some(arg);
            }
            _ if options.frames.is_none() => {
                let frames = arg
                    .parse()
                    .map_err(|_| AppError::Usage(format!("invalid frame count '{arg}'")))?;
                options.frames = Some(frames);
            }
            _ => return Err(AppError::Usage(format!("unexpected argument '{arg}'"))),
        }
    }
    Ok(options)
}

fn load_config(source: Option<&str>) -> Result<LessonConfig, AppError> {
    let source = source.unwrap_or(DEFAULT_LESSON);
    if source.ends_with(".toml") || source.ends_with(".ron") {
        Ok(LessonConfig::load(source)?)
    } else {
        Ok(LessonConfig::for_lesson(source)?)
    }
}

fn logged(mut panel: ParameterPanel) -> ParameterPanel {
    let title = panel.title().to_string();
    panel.on_change(move |name, value| log::info!("[{title}] {name} -> {value:?}"));
    panel
}

fn apply_edit(pipeline: &mut LessonPipeline, edit: &Edit) -> Result<(), AppError> {
    if edit.target == "material" {
        let mut panel = logged(material_panel(pipeline.material())?);
        panel.set(&edit.parameter, edit.value)?;
        panel.apply_to_material(pipeline.material_mut())?;
        return Ok(());
    }

    let light = pipeline
        .environment_mut()
        .light_mut(&edit.target)
        .ok_or_else(|| AppError::Usage(format!("no light named '{}'", edit.target)))?;
    let panel = match light.light_type {
        LightType::Directional => light_direction_panel(light)?,
        LightType::Point => point_light_panel(light)?,
    };
    let mut panel = logged(panel);
    panel.set(&edit.parameter, edit.value)?;
    panel.apply_to_light(light)?;
    Ok(())
}

fn report(pipeline: &LessonPipeline, elapsed_ms: f64) -> Result<(), AppError> {
    let samples = [
        ("top", Vec3::new(0.0, 1.0, 0.0)),
        ("front", Vec3::new(0.0, 0.0, 1.0)),
        ("side", Vec3::new(1.0, 0.0, 0.0)),
        ("bottom", Vec3::new(0.0, -1.0, 0.0)),
    ];
    println!("CPU reference colors at {elapsed_ms:.0} ms ({} mode):", pipeline.mode());
    for (label, n) in samples {
        let color = pipeline.shade_point(elapsed_ms, &SurfacePoint::new(n, n))?;
        println!(
            "  {label:>6}: [{:.3}, {:.3}, {:.3}, {:.3}]",
            color.x, color.y, color.z, color.w
        );
    }
    Ok(())
}

fn run() -> Result<(), AppError> {
    let options = parse_args(std::env::args().skip(1))?;
    let config = load_config(options.source.as_deref())?;
    logging::init(&config.log_level);
    log::info!("Starting rabbit lessons: '{}'", config.lesson);

    let frames = options.frames.or(config.frame_limit).unwrap_or(DEFAULT_FRAMES);
    let mut ctx = RecordingContext::new();
    let mut pipeline = LessonPipeline::new(&config, &mut ctx)?;
    for edit in &options.edits {
        apply_edit(&mut pipeline, edit)?;
    }

    let clock = FixedStepClock::sixty_hz();
    let stats = FrameLoop::new(clock)
        .with_frame_limit(Some(frames))
        .with_max_consecutive_failures(MAX_CONSECUTIVE_FAILURES)
        .run(&mut pipeline, &mut ctx)?;

    println!(
        "{}: {} frames drawn, {} skipped, {} uniform uploads",
        config.lesson,
        stats.rendered,
        stats.skipped,
        ctx.uniform_upload_count()
    );
    let last_ms = frames.saturating_sub(1) as f64 * 1000.0 / 60.0;
    report(&pipeline, last_ms)
}

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
