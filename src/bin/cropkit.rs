use std::fs;
use std::process::ExitCode;

use cropkit::{
    args::{self, RunPlan},
    compress::compress_export,
    config::EditorConfig,
    crop_err, crop_try,
    decode::Source,
    editor::{Editor, Outcome},
    error::{CropError, ErrorKind},
    help,
    script::parse_script,
};

fn main() -> ExitCode {
    env_logger::init();
    help::maybe_print_help_and_exit("cropkit");
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn real_main() -> Result<(), CropError> {
    let arguments: Vec<_> = std::env::args_os().collect();
    let plan = args::parse_args(arguments)?;
    let bytes = fs::read(&plan.input).map_err(|e| {
        crop_err!(
            ErrorKind::Io,
            "unable to open image `{}': {e}",
            plan.input.to_string_lossy()
        )
    })?;
    run_editor(&plan, Source::Bytes(bytes))
}

fn run_editor(plan: &RunPlan, source: Source) -> Result<(), CropError> {
    let events = match &plan.script {
        Some(path) => {
            let text = crop_try!(ErrorKind::Io, fs::read_to_string(path));
            parse_script(&text, plan.viewport.device_pixel_ratio)?
        }
        None => Vec::new(),
    };

    let config = EditorConfig {
        filter: plan.filter,
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(config);
    editor.open(source, plan.contract, plan.viewport)?;

    let mut outcome = None;
    for event in events {
        outcome = editor.handle(event)?;
        if outcome.is_some() {
            break;
        }
    }
    let outcome = match outcome {
        Some(outcome) => outcome,
        None => editor.confirm()?,
    };

    match outcome {
        Outcome::Confirmed(result) => {
            // the crop is re-encoded for upload when asked to, otherwise written as PNG
            let (bytes, width, height, mime_type) = match plan.compress {
                Some(preset) => {
                    let compressed = compress_export(&result, &preset.settings(), plan.filter)?;
                    let mime_type = compressed.format.mime_type();
                    (compressed.bytes, compressed.width, compressed.height, mime_type)
                }
                None => {
                    let mime_type = result.mime_type();
                    (result.png, result.width, result.height, mime_type)
                }
            };
            crop_try!(ErrorKind::Io, fs::write(&plan.output, &bytes));
            println!(
                "{} {width}x{height} {mime_type}",
                plan.output.to_string_lossy()
            );
        }
        Outcome::Cancelled => eprintln!("cancelled, nothing written"),
    }
    Ok(())
}
