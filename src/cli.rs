//! Command-line interface
//!
//! `cartonkit design` prints a die-line for the given dimensions,
//! `cartonkit allowances` shows or resets the stored allowance table and
//! `cartonkit flutes` lists the flute catalogue.

use anyhow::{bail, Context as _};
use cartonkit_core::units::{format_length, parse_length};
use cartonkit_core::{GlueSide, MeasurementSystem};
use cartonkit_dieline::rsc::ScoreKind;
use cartonkit_dieline::{DesignRequest, DieLine, DieLineEngine, GapEdit, GapLocks, GlueOff};
use cartonkit_settings::config::{default_config_path, ALLOWANCES_FILE, FLUTES_FILE};
use cartonkit_settings::{AllowanceStore, Config, FluteStore};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "cartonkit", version, about = "Die-line designer for corrugated cartons")]
pub struct Cli {
    /// Config file (.toml or .json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding flutes.json and panel_allowances.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// More log output (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Design a Regular Slotted Case blank.
    Design(DesignArgs),
    /// Show or reset the allowance table.
    Allowances(AllowancesArgs),
    /// List the flute catalogue.
    Flutes,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum UnitsChoice {
    Metric,
    Imperial,
}

impl From<UnitsChoice> for MeasurementSystem {
    fn from(choice: UnitsChoice) -> Self {
        match choice {
            UnitsChoice::Metric => MeasurementSystem::Metric,
            UnitsChoice::Imperial => MeasurementSystem::Imperial,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SideChoice {
    Inside,
    Outside,
}

impl From<SideChoice> for GlueSide {
    fn from(choice: SideChoice) -> Self {
        match choice {
            SideChoice::Inside => GlueSide::Inside,
            SideChoice::Outside => GlueSide::Outside,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OffChoice {
    Small,
    Large,
}

impl From<OffChoice> for GlueOff {
    fn from(choice: OffChoice) -> Self {
        match choice {
            OffChoice::Small => GlueOff::Small,
            OffChoice::Large => GlueOff::Large,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct DesignArgs {
    /// Internal length
    #[arg(short = 'l', long)]
    pub length: Option<String>,

    /// Internal width
    #[arg(short = 'w', long)]
    pub width: Option<String>,

    /// Internal height
    #[arg(short = 'H', long)]
    pub height: Option<String>,

    /// Board thickness (defaults to the flute's thickness)
    #[arg(short = 't', long)]
    pub thickness: Option<String>,

    /// Flute code (E, B, C, BC, ...)
    #[arg(short = 'f', long)]
    pub flute: Option<String>,

    /// FEFCO style code
    #[arg(long, default_value = "0201")]
    pub style: String,

    /// Allowance table section to read
    #[arg(long)]
    pub style_key: Option<String>,

    #[arg(long, value_enum)]
    pub glue_side: Option<SideChoice>,

    #[arg(long, value_enum)]
    pub glue_off: Option<OffChoice>,

    /// Glue lap width
    #[arg(long)]
    pub glue_lap: Option<String>,

    /// Explicit chamfer rise; 0 derives it from the bevel angle
    #[arg(long)]
    pub extension_a: Option<String>,

    /// Bevel angle in degrees
    #[arg(long)]
    pub bevel: Option<f64>,

    #[arg(long)]
    pub slot_width: Option<String>,

    #[arg(long)]
    pub gap_top_inner: Option<String>,
    #[arg(long)]
    pub gap_top_outer: Option<String>,
    #[arg(long)]
    pub gap_bot_inner: Option<String>,
    #[arg(long)]
    pub gap_bot_outer: Option<String>,

    /// Edit one gap after seeding, e.g. `top-inner=150`
    #[arg(long, value_name = "FIELD=VALUE")]
    pub edit: Option<String>,

    #[arg(long)]
    pub no_lock_top: bool,
    #[arg(long)]
    pub no_lock_bottom: bool,
    #[arg(long)]
    pub no_lock_symmetry: bool,

    /// Units for lengths on input and in the summary
    #[arg(long, value_enum)]
    pub units: Option<UnitsChoice>,

    /// Fail on inputs that would otherwise be repaired
    #[arg(long)]
    pub strict: bool,

    /// Print the complete die-line as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct AllowancesArgs {
    /// Rewrite the table with the defaults
    #[arg(long)]
    pub reset: bool,
}

/// Resolved storage locations and config
struct Context {
    config: Config,
    flutes_path: PathBuf,
    allowances_path: PathBuf,
}

fn load_context(cli: &Cli) -> anyhow::Result<Context> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let (flutes_path, allowances_path) = match &cli.data_dir {
        Some(dir) => (dir.join(FLUTES_FILE), dir.join(ALLOWANCES_FILE)),
        None => (
            config.storage.flutes_path()?,
            config.storage.allowances_path()?,
        ),
    };

    Ok(Context {
        config,
        flutes_path,
        allowances_path,
    })
}

/// Run a parsed command, writing results to `out`
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let ctx = load_context(cli)?;
    match &cli.command {
        Command::Design(args) => design(&ctx, args, out),
        Command::Allowances(args) => allowances(&ctx, args, out),
        Command::Flutes => flutes(&ctx, out),
    }
}

fn length_arg(
    value: &Option<String>,
    name: &str,
    units: MeasurementSystem,
    fallback: f64,
) -> anyhow::Result<f64> {
    match value {
        Some(text) => parse_length(text, units)
            .map_err(|e| anyhow::anyhow!("invalid {} '{}': {}", name, text, e)),
        None => Ok(fallback),
    }
}

fn parse_edit(text: &str, units: MeasurementSystem) -> anyhow::Result<(GapEdit, f64)> {
    let Some((field, value)) = text.split_once('=') else {
        bail!("--edit expects FIELD=VALUE, got '{}'", text);
    };
    let field: GapEdit = field.parse()?;
    if field == GapEdit::None {
        bail!("--edit needs a gap field");
    }
    let value = parse_length(value, units).map_err(|e| anyhow::anyhow!("invalid gap: {}", e))?;
    Ok((field, value))
}

fn build_request(
    ctx: &Context,
    args: &DesignArgs,
    flutes: &cartonkit_core::FluteCatalogue,
) -> anyhow::Result<(DesignRequest, MeasurementSystem)> {
    let defaults = &ctx.config.design;
    let units = args
        .units
        .map(MeasurementSystem::from)
        .unwrap_or(defaults.measurement_system);
    let mut request = defaults.to_request();

    if let Some(flute) = &args.flute {
        request.flute = flute.clone();
    }
    request.spec.style = args.style.clone();
    request.spec.length = length_arg(&args.length, "length", units, request.spec.length)?;
    request.spec.width = length_arg(&args.width, "width", units, request.spec.width)?;
    request.spec.height = length_arg(&args.height, "height", units, request.spec.height)?;
    request.spec.thickness = match &args.thickness {
        Some(_) => length_arg(&args.thickness, "thickness", units, request.spec.thickness)?,
        None => flutes
            .thickness_for(&request.flute)
            .unwrap_or(request.spec.thickness),
    };

    if let Some(side) = args.glue_side {
        request.glue.side = side.into();
    }
    if let Some(off) = args.glue_off {
        request.glue.off = off.into();
    }
    request.glue.lap_width = length_arg(&args.glue_lap, "glue lap", units, request.glue.lap_width)?;
    request.glue.extension_a =
        length_arg(&args.extension_a, "extension", units, request.glue.extension_a)?;
    if let Some(bevel) = args.bevel {
        request.glue.bevel_angle_deg = bevel;
    }
    request.slot.slot_width =
        length_arg(&args.slot_width, "slot width", units, request.slot.slot_width)?;

    Ok((request, units))
}

fn wants_custom_gaps(args: &DesignArgs) -> bool {
    args.gap_top_inner.is_some()
        || args.gap_top_outer.is_some()
        || args.gap_bot_inner.is_some()
        || args.gap_bot_outer.is_some()
        || args.edit.is_some()
        || args.no_lock_top
        || args.no_lock_bottom
        || args.no_lock_symmetry
}

fn design(ctx: &Context, args: &DesignArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let flute_store = FluteStore::load(&ctx.flutes_path)?;
    let allowance_store = AllowanceStore::load(&ctx.allowances_path, flute_store.catalogue())?;

    let (mut request, units) = build_request(ctx, args, flute_store.catalogue())?;
    if !args.strict {
        for problem in request.validate() {
            warn!("{}", problem);
        }
    }

    let style_key = args
        .style_key
        .as_deref()
        .unwrap_or(&ctx.config.design.style_key);
    let engine = DieLineEngine::new(allowance_store.table(), flute_store.catalogue())
        .with_style_key(style_key);

    let design_with = |request: &DesignRequest| {
        if args.strict {
            engine.design_strict(request)
        } else {
            engine.design(request)
        }
    };
    let mut die = design_with(&request)?;

    if wants_custom_gaps(args) {
        let mut gaps = die.gaps.clone();
        gaps.locks = GapLocks {
            top: !args.no_lock_top,
            bottom: !args.no_lock_bottom,
            symmetry: !args.no_lock_symmetry,
        };
        gaps.last_edited = GapEdit::None;

        // The last supplied field drives the locks
        let mut supplied: Vec<(GapEdit, f64)> = Vec::new();
        for (value, field) in [
            (&args.gap_top_inner, GapEdit::TopInner),
            (&args.gap_top_outer, GapEdit::TopOuter),
            (&args.gap_bot_inner, GapEdit::BotInner),
            (&args.gap_bot_outer, GapEdit::BotOuter),
        ] {
            if value.is_some() {
                let parsed = length_arg(value, "gap", units, 0.0)?;
                gaps = gaps.with_edit(field, parsed);
                supplied.push((field, parsed));
            }
        }
        if let Some(edit) = &args.edit {
            let (field, value) = parse_edit(edit, units)?;
            gaps = gaps.with_edit(field, value);
            supplied.retain(|(f, _)| *f != field);
            supplied.push((field, value));
        }

        request.gaps = Some(gaps);
        die = design_with(&request)?;

        for (field, wanted) in supplied {
            if let Some(actual) = die.gaps.get(field) {
                if (actual - wanted).abs() > 1e-9 {
                    warn!(
                        "Gap {} was given as {} mm but the locks set it to {} mm",
                        field, wanted, actual
                    );
                }
            }
        }
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &die)?;
        writeln!(out)?;
    } else {
        write_summary(&die, units, out)?;
    }
    Ok(())
}

/// Human-readable summary of a die-line
pub fn write_summary(
    die: &DieLine,
    units: MeasurementSystem,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let len = |v: f64| format_length(v, units);
    let layout = &die.layout;

    writeln!(
        out,
        "FEFCO 0201  L={} W={} H={}  flute {} t={}",
        len(die.spec.length),
        len(die.spec.width),
        len(die.spec.height),
        die.flute,
        len(die.spec.thickness)
    )?;
    writeln!(
        out,
        "Glue {} / {}  lap {}  bevel {}°",
        die.glue.side,
        die.glue.off,
        len(layout.glue_lap),
        die.glue.bevel_angle_deg
    )?;
    writeln!(
        out,
        "Sheet {} x {}",
        len(layout.total_width),
        len(layout.total_height)
    )?;

    let panels: Vec<String> = layout
        .panels
        .iter()
        .map(|p| format!("{} {}", p.role, len(p.width)))
        .collect();
    writeln!(out, "Panels  {}", panels.join(" | "))?;
    writeln!(
        out,
        "S2S {}  reference flap {}",
        len(layout.s2s),
        len(layout.reference_flap)
    )?;
    writeln!(
        out,
        "Flaps top {} / {}  bottom {} / {}",
        len(die.flaps.top.inner),
        len(die.flaps.top.outer),
        len(die.flaps.bottom.inner),
        len(die.flaps.bottom.outer)
    )?;
    writeln!(
        out,
        "Gaps top {} / {}  bottom {} / {}",
        len(die.gaps.top_inner),
        len(die.gaps.top_outer),
        len(die.gaps.bot_inner),
        len(die.gaps.bot_outer)
    )?;
    writeln!(
        out,
        "Slots {}  vertical scores {}",
        die.slots.intervals.len(),
        die.scores
            .iter()
            .filter(|s| s.kind == ScoreKind::Vertical)
            .count()
    )?;
    writeln!(
        out,
        "Folded flat {} x {} x {}",
        len(die.folded_flat.length),
        len(die.folded_flat.width),
        len(die.folded_flat.thickness)
    )?;
    Ok(())
}

fn allowances(ctx: &Context, args: &AllowancesArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let flute_store = FluteStore::load(&ctx.flutes_path)?;
    let mut store = AllowanceStore::load(&ctx.allowances_path, flute_store.catalogue())?;
    if args.reset {
        store.reset(flute_store.catalogue())?;
        writeln!(out, "Reset allowance table at {}", store.path().display())?;
        return Ok(());
    }
    serde_json::to_writer_pretty(&mut *out, store.table())?;
    writeln!(out)?;
    Ok(())
}

fn flutes(ctx: &Context, out: &mut impl Write) -> anyhow::Result<()> {
    let store = FluteStore::load(&ctx.flutes_path)?;
    for flute in store.catalogue().iter() {
        writeln!(out, "{:<4} {} mm", flute.flute, flute.thickness)?;
    }
    Ok(())
}
