use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use wages_app::config::{AppConfig, StoreTarget, DEFAULT_ADDR, DEFAULT_STORE};
use wages_app::platform::app::Session;
use wages_app::platform::logging::{self, LogDestination};
use wages_app::platform::ui::render;
use wages_app::server::{self, ServerState};
use wages_core::{
    BannerLevel, Msg, RateDraft, RegionDraft, SectorFilter, SortKey, TrancheDraft, ViewMode,
};
use wages_engine::codec::decode;
use wages_engine::{write_export, write_template, FileFormat, FileRecordStore};
use wages_logging::wages_info;

#[derive(Parser)]
#[command(name = "wage-board")]
#[command(about = "Regional minimum wage rates: view, edit, import, export and serve")]
struct Cli {
    /// Data file path or base URL of a wage board server.
    #[arg(long, global = true, env = "WAGE_BOARD_STORE", default_value = DEFAULT_STORE)]
    store: String,
    /// Change channel: signal file path, server URL, or `none`.
    #[arg(long, global = true)]
    notifier: Option<String>,
    #[arg(long, global = true, value_enum, default_value_t = LogArg::Terminal)]
    log: LogArg,
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the data file over HTTP.
    Serve {
        #[arg(long, env = "WAGE_BOARD_ADDR", default_value = DEFAULT_ADDR)]
        addr: SocketAddr,
    },
    /// Show regions as cards or a table.
    View {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        sector: Option<SectorArg>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Keep running and redraw when the data changes.
        #[arg(long, default_value_t = false)]
        watch: bool,
    },
    /// Editor list of regions in stored order.
    List,
    /// Turn update notifications on or off.
    Notifications {
        #[arg(value_enum)]
        state: SwitchArg,
    },
    /// Write the current data to `wage-rates-<date>.<ext>`.
    Export {
        #[arg(value_enum)]
        format: FormatArg,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Write a blank import template.
    Template {
        #[arg(value_enum)]
        format: FormatArg,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Replace all regions with the contents of a JSON, CSV or XLSX file.
    Import {
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Apply the import instead of only previewing it.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Add a region or change an existing one.
    Upsert(UpsertArgs),
    /// Remove a region by id.
    Delete { id: String },
}

#[derive(clap::Args)]
struct UpsertArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    wage_order: Option<String>,
    #[arg(long)]
    date_effective: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Non-Agriculture daily amount (single rate).
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    coverage: Option<String>,
    /// Non-Agriculture tranche as `AMOUNT@DATE[@COVERAGE]`; give up to two.
    #[arg(long = "tranche")]
    tranches: Vec<String>,
    #[arg(long)]
    agri_amount: Option<String>,
    #[arg(long)]
    agri_coverage: Option<String>,
    #[arg(long = "agri-tranche")]
    agri_tranches: Vec<String>,
    /// Remove the Agriculture rate.
    #[arg(long, default_value_t = false)]
    no_agri: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogArg {
    File,
    Terminal,
    Both,
    Off,
}

impl From<LogArg> for LogDestination {
    fn from(value: LogArg) -> Self {
        match value {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
            LogArg::Off => LogDestination::Off,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SectorArg {
    All,
    Agriculture,
    NonAgriculture,
}

impl From<SectorArg> for SectorFilter {
    fn from(value: SectorArg) -> Self {
        match value {
            SectorArg::All => SectorFilter::All,
            SectorArg::Agriculture => SectorFilter::Agriculture,
            SectorArg::NonAgriculture => SectorFilter::NonAgriculture,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    RegionAsc,
    RegionDesc,
    WageHigh,
    WageLow,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::RegionAsc => SortKey::RegionAsc,
            SortArg::RegionDesc => SortKey::RegionDesc,
            SortArg::WageHigh => SortKey::WageHigh,
            SortArg::WageLow => SortKey::WageLow,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Grid,
    List,
}

impl From<ModeArg> for ViewMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Grid => ViewMode::Grid,
            ModeArg::List => ViewMode::List,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SwitchArg {
    On,
    Off,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
    Xlsx,
}

impl From<FormatArg> for FileFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => FileFormat::Json,
            FormatArg::Csv => FileFormat::Csv,
            FormatArg::Xlsx => FileFormat::Xlsx,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log.into(), cli.verbose);

    let config = AppConfig::new(&cli.store, cli.notifier.as_deref());
    match cli.command {
        Command::Serve { addr } => serve(&config, addr),
        Command::View {
            search,
            sector,
            sort,
            mode,
            watch,
        } => view(&config, search, sector, sort, mode, watch),
        Command::List => list(&config),
        Command::Notifications { state } => notifications(&config, state == SwitchArg::On),
        Command::Export { format, dir } => export(&config, format.into(), &dir),
        Command::Template { format, dir } => {
            let path = write_template(&dir, format.into())?;
            println!("Template written to {}", path.display());
            Ok(())
        }
        Command::Import { file, format, yes } => import(&config, &file, format, yes),
        Command::Upsert(args) => upsert(&config, args),
        Command::Delete { id } => delete(&config, &id),
    }
}

fn serve(config: &AppConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let StoreTarget::File(path) = &config.store else {
        bail!("`serve` needs a data file path as --store");
    };
    let state = ServerState::new(FileRecordStore::new(path), config.engine.clock.clone());
    let runtime = tokio::runtime::Runtime::new().context("cannot start server runtime")?;
    runtime.block_on(server::serve(addr, state))
}

/// Opens a session and waits for the first load.
fn open_settled(config: &AppConfig) -> anyhow::Result<Session> {
    let mut session = Session::open(config)?;
    if !session.settle() {
        bail!("timed out waiting for the record store");
    }
    Ok(session)
}

fn view(
    config: &AppConfig,
    search: Option<String>,
    sector: Option<SectorArg>,
    sort: Option<SortArg>,
    mode: Option<ModeArg>,
    watch: bool,
) -> anyhow::Result<()> {
    let mut session = open_settled(config)?;
    if let Some(term) = search {
        session.dispatch(Msg::SearchChanged(term));
    }
    if let Some(sector) = sector {
        session.dispatch(Msg::SectorFilterChanged(sector.into()));
    }
    if let Some(sort) = sort {
        session.dispatch(Msg::SortChanged(sort.into()));
    }
    if let Some(mode) = mode {
        if session.view().view.view_mode != ViewMode::from(mode) {
            session.dispatch(Msg::ViewToggled);
        }
    }
    print!("{}", render::render(&session.view()));
    let _ = session.take_render();

    if !watch {
        return Ok(());
    }
    wages_info!("Watching for updates every {:?}", config.engine.poll_interval);
    loop {
        session.poll_once(config.engine.poll_interval);
        for last_updated in session.take_notifications() {
            println!("{}", render::notification_line(&last_updated));
        }
        if let Some(view) = session.take_render() {
            print!("{}", render::render(&view));
        }
    }
}

fn list(config: &AppConfig) -> anyhow::Result<()> {
    let session = open_settled(config)?;
    let view = session.view();
    if let Some(banner) = &view.banner {
        println!("{}", render::banner_line(banner));
    }
    print!("{}", render::render_admin(&view.admin_rows));
    Ok(())
}

fn notifications(config: &AppConfig, enabled: bool) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    if session.view().notifications_enabled != enabled {
        session.dispatch(Msg::NotificationsToggled);
    }
    println!(
        "Update notifications {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn export(config: &AppConfig, format: FileFormat, dir: &Path) -> anyhow::Result<()> {
    let session = open_settled(config)?;
    let document = session
        .state()
        .document()
        .ok_or_else(|| anyhow!("no wage data to export"))?;
    let clock = &config.engine.clock;
    let path = write_export(dir, document, format, &clock.today(), &clock.timestamp())?;
    println!("Exported {} regions to {}", document.regions.len(), path.display());
    Ok(())
}

fn import(
    config: &AppConfig,
    file: &Path,
    format: Option<FormatArg>,
    yes: bool,
) -> anyhow::Result<()> {
    let format = match format {
        Some(format) => format.into(),
        None => FileFormat::from_path(file)
            .ok_or_else(|| anyhow!("cannot tell the format of {}; pass --format", file.display()))?,
    };
    let bytes = fs::read(file).with_context(|| format!("cannot read {}", file.display()))?;

    let mut session = open_settled(config)?;
    session.dispatch(Msg::ImportParsed(decode(format, &bytes)));
    let view = session.view();
    let Some(preview) = &view.import_preview else {
        return finish(&session);
    };
    print!("{}", render::render_admin(preview));

    if !yes {
        session.dispatch(Msg::ImportCancelled);
        println!("Preview only; re-run with --yes to replace all regions.");
        return Ok(());
    }
    session.dispatch(Msg::ImportConfirmed);
    settle_mutation(session)
}

fn tranche_draft(raw: &str) -> anyhow::Result<TrancheDraft> {
    let mut parts = raw.splitn(3, '@');
    let amount = parts.next().unwrap_or_default().trim().to_string();
    let effective_date = parts
        .next()
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .ok_or_else(|| anyhow!("tranche `{raw}` must look like AMOUNT@DATE[@COVERAGE]"))?
        .to_string();
    let coverage = parts.next().unwrap_or_default().trim().to_string();
    Ok(TrancheDraft {
        amount,
        effective_date,
        coverage,
    })
}

/// Tranche flags win over a single amount; untouched rates keep their
/// prefilled values.
fn merge_rate(
    current: Option<RateDraft>,
    amount: Option<String>,
    coverage: Option<String>,
    tranches: &[String],
) -> anyhow::Result<Option<RateDraft>> {
    if tranches.len() > 2 {
        bail!("at most two tranches per rate");
    }
    if !tranches.is_empty() {
        let first = tranche_draft(&tranches[0])?;
        let second = match tranches.get(1) {
            Some(raw) => tranche_draft(raw)?,
            None => TrancheDraft::default(),
        };
        return Ok(Some(RateDraft::tranches(first, second)));
    }
    match (current, amount) {
        (current, Some(amount)) => {
            let coverage = coverage
                .or_else(|| current.map(|draft| draft.coverage))
                .unwrap_or_default();
            Ok(Some(RateDraft::single(amount, coverage)))
        }
        (Some(mut draft), None) => {
            if let Some(coverage) = coverage {
                draft.coverage = coverage;
            }
            Ok(Some(draft))
        }
        (None, None) => Ok(None),
    }
}

fn upsert(config: &AppConfig, args: UpsertArgs) -> anyhow::Result<()> {
    let mut session = open_settled(config)?;
    let document = session.state().document().cloned().unwrap_or_default();
    let index = document.position(args.id.trim());
    let mut draft = match index {
        Some(index) => RegionDraft::from_region(&document.regions[index]),
        None => RegionDraft {
            id: args.id.clone(),
            ..RegionDraft::default()
        },
    };

    if let Some(name) = args.name {
        draft.name = name;
    }
    if let Some(wage_order) = args.wage_order {
        draft.wage_order = wage_order;
    }
    if let Some(date_effective) = args.date_effective {
        draft.date_effective = date_effective;
    }
    if let Some(notes) = args.notes {
        draft.notes = notes;
    }
    draft.non_agriculture = merge_rate(
        Some(draft.non_agriculture),
        args.amount,
        args.coverage,
        &args.tranches,
    )?
    .unwrap_or_default();
    draft.agriculture = if args.no_agri {
        None
    } else {
        merge_rate(
            draft.agriculture,
            args.agri_amount,
            args.agri_coverage,
            &args.agri_tranches,
        )?
    };

    session.dispatch(Msg::RegionSubmitted { index, draft });
    settle_mutation(session)
}

fn delete(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let mut session = open_settled(config)?;
    let index = session
        .state()
        .document()
        .and_then(|document| document.position(id))
        .ok_or_else(|| anyhow!("no region with id `{id}`"))?;
    session.dispatch(Msg::RegionDeleted { index });
    settle_mutation(session)
}

fn settle_mutation(mut session: Session) -> anyhow::Result<()> {
    if !session.settle() {
        bail!("timed out waiting for the record store");
    }
    finish(&session)
}

/// Prints the outcome banner; an error banner fails the command.
fn finish(session: &Session) -> anyhow::Result<()> {
    match session.view().banner {
        Some(banner) if banner.level == BannerLevel::Error => Err(anyhow!(banner.message)),
        Some(banner) => {
            println!("{}", render::banner_line(&banner));
            Ok(())
        }
        None => Ok(()),
    }
}
