//! geoprint – command-line map scene → PDF exporter.
//!
//! Usage:
//!   geoprint <scene.json> [output.pdf] [--landscape] [--format a4|letter|legal]
//!            [--dpi N] [--title "..."] [--author "..."] [--margin PT]
//!            [--no-grid] [--no-legend]
//!
//! If `output.pdf` is omitted the PDF is written next to the scene file
//! with the same stem (e.g. `territorio.json` → `territorio.pdf`).

use std::{env, fs, path::PathBuf, process};

use geoprint::paper::{Margins, Orientation, PaperFormat};
use geoprint::pipeline::{export_map, ExportRequest};
use geoprint::scene::{Scene, SceneRenderer};

// Starting "screen" size handed to the software renderer; exports resize
// it temporarily and restore it.
const SCREEN_W: u32 = 1024;
const SCREEN_H: u32 = 768;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut request = ExportRequest::default();
    let mut title: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => request.orientation = Orientation::Horizontal,
            "--no-grid" => request.show_grid = false,
            "--no-legend" => request.include_legend = false,
            "--format" | "-f" => match iter.next().and_then(|v| PaperFormat::parse(v)) {
                Some(f) => request.format = f,
                None => {
                    eprintln!("--format expects a4, letter or legal");
                    process::exit(1);
                }
            },
            "--dpi" => match iter.next().and_then(|v| v.parse::<f64>().ok()) {
                Some(dpi) => request.dpi = dpi,
                None => {
                    eprintln!("--dpi expects a number");
                    process::exit(1);
                }
            },
            "--margin" | "-m" => match iter.next().and_then(|v| v.parse::<f64>().ok()) {
                Some(pt) => request.margins = Margins::uniform(pt),
                None => {
                    eprintln!("--margin expects a size in points");
                    process::exit(1);
                }
            },
            "--title" | "-t" => match iter.next() {
                Some(v) => title = Some(v.clone()),
                None => {
                    eprintln!("--title expects a value");
                    process::exit(1);
                }
            },
            "--author" | "-a" => match iter.next() {
                Some(v) => request.author = v.clone(),
                None => {
                    eprintln!("--author expects a value");
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no scene file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    // Default output: same directory + same stem as input, but with .pdf
    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension("pdf");
        o
    });

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let scene = match Scene::from_json(&json) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", input.display());
            process::exit(1);
        }
    };

    // Default title: stem of the scene filename.
    request.title = title.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Mapa")
            .to_string()
    });

    let view = scene.view;
    let layers = scene.layer_infos();
    let mut renderer = SceneRenderer::new(scene, SCREEN_W, SCREEN_H);

    match export_map(&mut renderer, &view, &layers, &request) {
        Ok(bytes) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &bytes) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            eprintln!("Wrote '{}' ({} bytes)", output.display(), bytes.len());
        }
        Err(e) => {
            eprintln!("Export failed [{}]: {}", e.stage, e.message);
            if let Some(cause) = &e.cause {
                eprintln!("  caused by: {cause}");
            }
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("geoprint – map scene to PDF exporter");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <scene.json> [output.pdf] [flags]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <scene.json>   Scene file (view + vector layers)");
    eprintln!("  [output.pdf]   Output path  (default: same stem as input with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --format, -f   Paper format: a4 (default), letter, legal");
    eprintln!("  --landscape    Horizontal orientation");
    eprintln!("  --dpi          Export resolution (default: 150)");
    eprintln!("  --margin, -m   Uniform margin in points (default: 20)");
    eprintln!("  --title, -t    Map title (default: scene filename stem)");
    eprintln!("  --author, -a   Author shown in the page footer");
    eprintln!("  --no-grid      Skip the coordinate grid overlay");
    eprintln!("  --no-legend    Skip the layer legend");
    eprintln!("  --help         Print this message");
}
