//! ffmpeg command-line rendering.
//!
//! [`filter_graph`] serializes a [`CompositionPlan`] into `-filter_complex`
//! syntax; the `*_args` functions build the argument vectors for the three
//! ffmpeg invocations of a clip.

use std::path::Path;

use vertcut_common::config::EncoderConfig;
use vertcut_layout_model::fragment::Fragment;
use vertcut_layout_model::geometry::Rect;
use vertcut_layout_model::layout::Color;

use crate::compositor::{CompositionPlan, Pad, PlanInput, PlanOp, Source};

/// Label of the final video pad.
pub const OUTPUT_LABEL: &str = "vout";

fn pad_label(pad: Pad) -> String {
    match pad {
        Pad::Base => "bg".to_string(),
        Pad::Normalized(n) => format!("n{n}"),
        Pad::Scaled(n) => format!("s{n}"),
        Pad::Stage(n) => format!("c{n}"),
        Pad::Output => OUTPUT_LABEL.to_string(),
    }
}

fn source_label(source: Source) -> String {
    match source {
        Source::Input(i) => format!("{i}:v"),
        Source::Pad(pad) => pad_label(pad),
    }
}

fn color_arg(color: Color) -> String {
    format!("0x{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn render_op(op: &PlanOp) -> String {
    match op {
        PlanOp::Fill {
            color,
            width,
            height,
            fps,
            duration_secs,
            output,
        } => {
            let mut chain = format!(
                "color=c={}:s={width}x{height}:r={fps}",
                color_arg(*color)
            );
            if let Some(d) = duration_secs {
                chain.push_str(&format!(":d={d:.3}"));
            }
            format!("{chain}[{}]", pad_label(*output))
        }
        PlanOp::StretchImage {
            source,
            width,
            height,
            fps,
            output,
        } => format!(
            "[{}]scale={width}:{height}:force_original_aspect_ratio=disable,fps={fps}[{}]",
            source_label(*source),
            pad_label(*output)
        ),
        PlanOp::NormalizeFps {
            source,
            fps,
            output,
        } => format!(
            "[{}]fps={fps}[{}]",
            source_label(*source),
            pad_label(*output)
        ),
        PlanOp::Scale {
            source,
            width,
            height,
            output,
        } => format!(
            "[{}]scale={width}:{height}:force_original_aspect_ratio=disable[{}]",
            source_label(*source),
            pad_label(*output)
        ),
        PlanOp::OverlayAt {
            base,
            top,
            x,
            y,
            shortest,
            output,
        } => format!(
            "[{}][{}]overlay={x}:{y}:shortest={}[{}]",
            pad_label(*base),
            pad_label(*top),
            u8::from(*shortest),
            pad_label(*output)
        ),
    }
}

/// Serialize the plan's ops, in order, as one `-filter_complex` string.
pub fn filter_graph(plan: &CompositionPlan) -> String {
    plan.ops.iter().map(render_op).collect::<Vec<_>>().join(";")
}

fn quiet_prefix() -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ]
}

fn video_codec_args(encoder: &EncoderConfig, preset: &str) -> Vec<String> {
    vec![
        "-c:v".to_string(),
        encoder.codec.clone(),
        "-preset".to_string(),
        preset.to_string(),
        "-crf".to_string(),
        encoder.crf.to_string(),
    ]
}

/// Stream-copy a time window out of the source.
pub fn fragment_args(source: &Path, fragment: &Fragment, output: &Path) -> Vec<String> {
    let mut args = quiet_prefix();
    args.extend([
        "-ss".to_string(),
        format!("{:.3}", fragment.start_secs),
        "-i".to_string(),
        source.display().to_string(),
        "-t".to_string(),
        format!("{:.3}", fragment.duration_secs),
        "-c".to_string(),
        "copy".to_string(),
        output.display().to_string(),
    ]);
    args
}

/// Re-encode one region of the input, audio passed through.
pub fn crop_args(input: &Path, rect: &Rect, encoder: &EncoderConfig, output: &Path) -> Vec<String> {
    let mut args = quiet_prefix();
    args.extend([
        "-i".to_string(),
        input.display().to_string(),
        "-filter:v".to_string(),
        format!("crop={}:{}:{}:{}", rect.width, rect.height, rect.x, rect.y),
    ]);
    args.extend(video_codec_args(encoder, &encoder.crop_preset));
    args.extend([
        "-c:a".to_string(),
        "copy".to_string(),
        output.display().to_string(),
    ]);
    args
}

/// Full composite invocation for a plan.
pub fn composite_args(plan: &CompositionPlan, encoder: &EncoderConfig, output: &Path) -> Vec<String> {
    let mut args = quiet_prefix();
    for input in &plan.inputs {
        match input {
            PlanInput::LoopedImage { path } => args.extend([
                "-loop".to_string(),
                "1".to_string(),
                "-i".to_string(),
                path.display().to_string(),
            ]),
            PlanInput::Media { path, .. } => {
                args.extend(["-i".to_string(), path.display().to_string()])
            }
        }
    }

    args.extend([
        "-filter_complex".to_string(),
        filter_graph(plan),
        "-map".to_string(),
        format!("[{OUTPUT_LABEL}]"),
        "-map".to_string(),
        format!("{}:a?", plan.audio_input),
    ]);
    args.extend(video_codec_args(encoder, &encoder.composite_preset));
    args.extend([
        "-c:a".to_string(),
        encoder.audio_codec.clone(),
        "-r".to_string(),
        plan.fps.to_string(),
    ]);
    if let Some(limit) = plan.duration_limit {
        args.extend(["-t".to_string(), format!("{limit:.3}")]);
    }
    args.extend([
        "-avoid_negative_ts".to_string(),
        "make_zero".to_string(),
        "-shortest".to_string(),
        output.display().to_string(),
    ]);
    args
}
