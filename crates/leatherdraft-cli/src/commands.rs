use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use leatherdraft_block::{interpret, Block, Measurements, Options};
use leatherdraft_core::GeometryDocument;
use leatherdraft_geometry::{attach_seam_allowance, is_simple, piece_polyline, DEFAULT_TOLERANCE};
use leatherdraft_parser::parse_dsl;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Drafted when neither a block nor a DSL file is given.
pub const DEMO_DSL: &str = r#"PIECE front_panel_A
MOVE 0,0
LINE 0,520
LINE 140,520
LINE 140,0
CLOSE
NOTCH 20,520 "CF hem"
GRAIN 30,20 -> 30,300
SA 8
END
"#;

pub enum Source {
    Block(PathBuf),
    Dsl(PathBuf),
    Demo,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Could not write {}", path.display()))
}

fn load_document(path: &Path) -> Result<GeometryDocument> {
    serde_json::from_str(&read(path)?)
        .with_context(|| format!("{} is not a geometry document", path.display()))
}

pub fn draft(
    measurements: Option<&Path>,
    recipe: Option<&Path>,
    source: &Source,
    out: &Path,
) -> Result<()> {
    let pieces = match source {
        Source::Block(path) => {
            let measurements = match measurements {
                Some(path) => serde_json::from_str::<Measurements>(&read(path)?)
                    .with_context(|| format!("Invalid measurements in {}", path.display()))?,
                None => Measurements::default(),
            };
            let options = match recipe {
                Some(path) => {
                    let recipe: serde_yaml::Value = serde_yaml::from_str(&read(path)?)
                        .with_context(|| format!("Invalid recipe in {}", path.display()))?;
                    Options::from_recipe(&recipe)
                }
                None => Options::default(),
            };
            let text = read(path)?;
            let block = if is_yaml(path) {
                Block::from_yaml(&text)
            } else {
                Block::from_json(&text)
            }
            .with_context(|| format!("Invalid pattern block in {}", path.display()))?;
            info!(block = %path.display(), pieces = block.pieces.len(), "interpreting block");
            interpret(&block, &measurements.body, &measurements.fit, &options)
                .with_context(|| format!("Could not draft {}", path.display()))?
        }
        Source::Dsl(path) => {
            info!(dsl = %path.display(), "parsing pattern DSL");
            parse_dsl(&read(path)?).with_context(|| format!("Could not parse {}", path.display()))?
        }
        Source::Demo => {
            warn!("no block or DSL given, drafting the demo piece");
            parse_dsl(DEMO_DSL)?
        }
    };

    let document = GeometryDocument::new(pieces);
    write_json(out, &document)?;
    info!(pieces = document.pieces.len(), out = %out.display(), "wrote geometry");
    Ok(())
}

/// `seam_allowance` from an options file, if present.
fn allowance_option(path: &Path) -> Result<Option<f64>> {
    let options: serde_yaml::Value = serde_yaml::from_str(&read(path)?)
        .with_context(|| format!("Invalid options in {}", path.display()))?;
    match options.get("seam_allowance") {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(value) => match value.as_f64() {
            Some(mm) if mm.is_finite() => Ok(Some(mm)),
            _ => bail!("seam_allowance in {} must be a number", path.display()),
        },
    }
}

pub fn construct(input: &Path, options: Option<&Path>, out: &Path) -> Result<()> {
    let mut document = load_document(input)?;
    let allowance = options.map(allowance_option).transpose()?.flatten();
    debug!(?allowance, "default seam allowance");

    let attached = attach_seam_allowance(&mut document.pieces, allowance);
    write_json(out, &document)?;
    info!(
        attached,
        pieces = document.pieces.len(),
        out = %out.display(),
        "wrote seam allowances"
    );
    Ok(())
}

/// Prints one line per piece. Returns `false` when any outline is not simple.
pub fn validate(input: &Path) -> Result<bool> {
    let document = load_document(input)?;
    let mut ok = true;

    for piece in &document.pieces {
        let outline = piece_polyline(piece, DEFAULT_TOLERANCE)
            .with_context(|| format!("Could not flatten piece {}", piece.name))?;
        let outline_ok = is_simple(&outline);
        let sa_ok = piece.seam_allowance_outline.as_deref().map(is_simple);

        let sa = match sa_ok {
            Some(true) => "ok",
            Some(false) => "NOT SIMPLE",
            None => "none",
        };
        println!(
            "{}: outline {}, seam allowance {sa}",
            piece.name,
            if outline_ok { "ok" } else { "NOT SIMPLE" }
        );
        ok &= outline_ok && sa_ok != Some(false);
    }

    Ok(ok)
}
