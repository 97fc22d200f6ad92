use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;

use crate::{
    AnalysisSession,
    common::storage::LocalStore,
    engine::{
        auth,
        client::{AnalysisClient, CannedClient, GeminiClient},
        config::OutputFormat,
        config_file::ConfigFile,
        history::{self, HistoryLog},
        model::{AnalysisType, BusinessData, BusinessProfile, PersonalData},
        profile,
        session::AnalysisInput,
    },
    ui::{
        cli::{AnalyzeArgs, Cli, Command, HistoryCommand, ProfileCommand},
        config::{
            build_analysis_config, load_config_file, needs_interactive_ui, template_override,
        },
        output::{self, OutputHandler},
        prompter::{LinePrompter, Prompter},
        template::{self, user_template_path},
        wizard,
    },
};

// Gated imports for colors feature
#[cfg(feature = "colors")]
use colored::{ColoredString, Colorize};

/// The primary orchestration function for the application.
pub fn run(args: Cli) -> Result<()> {
    let store = LocalStore::open(LocalStore::resolve_root(args.data_dir.as_deref()))?;
    log::debug!("data directory: {}", store.root().display());

    match &args.command {
        Command::Login { email } => {
            auth::login(&store)?;
            let who = email.as_deref().unwrap_or("consultor");
            println!("{}", colour(format!("Bem-vindo ao NÚCLEO, {who}.")));
            Ok(())
        }
        Command::Logout => {
            auth::logout(&store)?;
            println!("Sessão encerrada.");
            Ok(())
        }
        Command::ListTemplates => list_templates(&args),
        Command::Profile(cmd) => run_profile(&args, &store, cmd),
        Command::History(cmd) => {
            require_login(&store)?;
            run_history(&args, &store, cmd)
        }
        Command::Analyze(analyze) => {
            require_login(&store)?;
            let cfg_file = load_config_file(&args)?;
            run_analysis(&args, &store, &cfg_file, analyze)
        }
    }
}

fn require_login(store: &LocalStore) -> Result<()> {
    if !auth::is_logged_in(store) {
        bail!("Acesso restrito: execute `nucleo login` primeiro.");
    }
    Ok(())
}

// ──────────────────────────────────────────────────────────────
//  Analysis
// ──────────────────────────────────────────────────────────────
fn run_analysis(
    args: &Cli,
    store: &LocalStore,
    cfg_file: &ConfigFile,
    analyze: &AnalyzeArgs,
) -> Result<()> {
    let kind = analyze.kind;
    let config = build_analysis_config(args, cfg_file, kind)?;

    let tpl_path = template_override(args, cfg_file, kind);
    let (tpl_content, tpl_hash) = template::resolve_template(kind, tpl_path.as_deref())?;
    log::info!(
        "using {} template ({})",
        kind.slug(),
        if tpl_hash == "builtin" { "built-in" } else { &tpl_hash[..12] }
    );

    let input = match &analyze.data_file {
        Some(path) => load_input(store, kind, path)?,
        None => collect_input(args, store, kind)?,
    };

    let client: Box<dyn AnalysisClient> = match &analyze.dry_run {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read response file {}", path.display()))?;
            Box::new(CannedClient::new(text))
        }
        None => Box::new(GeminiClient::from_config(&config).map_err(|e| {
            log::warn!("{e}");
            anyhow::anyhow!(crate::engine::session::GENERIC_FAILURE)
        })?),
    };

    let session = AnalysisSession::new(config, tpl_content);
    let outcome = with_spinner(!args.no_interactive, || {
        session.run(client.as_ref(), &input, Some(store))
    })?;

    OutputHandler::new(
        kind,
        input.period(),
        &outcome.response,
        args.output_format,
        needs_interactive_ui(args),
    )
    .with_record(outcome.record.as_ref())
    .with_output_file(analyze.output_file.as_deref())
    .handle()
}

/// Reads the figures from a JSON file shaped like the stored records.
fn load_input(store: &LocalStore, kind: AnalysisType, path: &Path) -> Result<AnalysisInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;
    Ok(match kind {
        AnalysisType::Business => {
            let data: BusinessData = parse_data_file(path, &content)
                .with_context(|| format!("Invalid business data in {}", path.display()))?;
            AnalysisInput::Business {
                data,
                profile: Some(profile::load(store)?),
            }
        }
        AnalysisType::Personal => AnalysisInput::Personal(
            parse_data_file::<PersonalData>(path, &content)
                .with_context(|| format!("Invalid personal data in {}", path.display()))?,
        ),
    })
}

/// `.toml` data files are read as TOML, anything else as JSON.
fn parse_data_file<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        Ok(toml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

fn collect_input(args: &Cli, store: &LocalStore, kind: AnalysisType) -> Result<AnalysisInput> {
    if args.no_interactive {
        bail!("--no-interactive requires --data-file");
    }
    let mut prompter = terminal_prompter();
    let today = chrono::Local::now().date_naive();

    Ok(match kind {
        AnalysisType::Business => {
            let mut biz_profile = profile::load(store)?;
            if !biz_profile.is_configured() && wizard::profile_reminder(prompter.as_mut())? {
                biz_profile = edit_and_save_profile(prompter.as_mut(), store, &biz_profile)?;
            }
            let data = wizard::collect_business(prompter.as_mut(), today)?;
            AnalysisInput::Business {
                data,
                profile: Some(biz_profile),
            }
        }
        AnalysisType::Personal => {
            AnalysisInput::Personal(wizard::collect_personal(prompter.as_mut(), today)?)
        }
    })
}

fn terminal_prompter() -> Box<dyn Prompter> {
    #[cfg(feature = "interactive")]
    if atty::is(atty::Stream::Stdin) {
        return Box::new(crate::ui::prompter::InquirePrompter);
    }
    Box::new(LinePrompter::new(
        std::io::BufReader::new(std::io::stdin()),
        std::io::stdout(),
    ))
}

#[cfg(feature = "interactive")]
fn with_spinner<T>(enabled: bool, work: impl FnOnce() -> T) -> T {
    if !enabled || !atty::is(atty::Stream::Stderr) {
        return work();
    }
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message("Analisando dados… O NÚCLEO está processando");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    let result = work();
    spinner.finish_and_clear();
    result
}

#[cfg(not(feature = "interactive"))]
fn with_spinner<T>(_enabled: bool, work: impl FnOnce() -> T) -> T {
    work()
}

// ──────────────────────────────────────────────────────────────
//  Profile
// ──────────────────────────────────────────────────────────────
fn run_profile(args: &Cli, store: &LocalStore, cmd: &ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Edit => {
            if args.no_interactive {
                bail!("Editing the profile needs an interactive terminal");
            }
            let current = profile::load(store)?;
            let mut prompter = terminal_prompter();
            edit_and_save_profile(prompter.as_mut(), store, &current)?;
            println!("{}", colour("Perfil salvo."));
            Ok(())
        }
        ProfileCommand::Show => {
            let current = profile::load(store)?;
            match args.output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&current)?),
                OutputFormat::Text if !current.is_configured() => {
                    println!("Nenhum perfil configurado. Use `nucleo profile edit`.")
                }
                OutputFormat::Text => print!("{}", describe_profile(&current)),
            }
            Ok(())
        }
        ProfileCommand::Clear => {
            profile::clear(store)?;
            println!("Perfil removido.");
            Ok(())
        }
    }
}

fn edit_and_save_profile(
    prompter: &mut dyn Prompter,
    store: &LocalStore,
    current: &BusinessProfile,
) -> Result<BusinessProfile> {
    let updated = wizard::edit_profile(prompter, current)?;
    profile::save(store, &updated)?;
    Ok(updated)
}

fn describe_profile(p: &BusinessProfile) -> String {
    let rows = [
        ("Nome Fantasia", p.general.name.clone()),
        ("Segmento", p.general.segment.clone()),
        ("Tempo de Negócio", p.general.years_in_business.clone()),
        ("Cidade/UF", p.general.location.clone()),
        ("Tipo de Loja", p.structure.store_type.label().to_string()),
        ("Horário", p.structure.hours.clone()),
        ("Produtos/Serviços", p.operation.offerings.clone()),
        ("Canais de Venda", p.operation.sales_channel.join(", ")),
        ("Método de Controle", p.finance.method.label().to_string()),
        ("Frequência", p.finance.frequency.clone()),
        ("Fornecedores", p.operation.suppliers.clone()),
    ];
    rows.iter()
        .map(|(label, value)| format!("{label:<20} {value}\n"))
        .collect()
}

// ──────────────────────────────────────────────────────────────
//  History
// ──────────────────────────────────────────────────────────────
fn run_history(args: &Cli, store: &LocalStore, cmd: &HistoryCommand) -> Result<()> {
    match cmd {
        HistoryCommand::List => {
            let log = HistoryLog::load(store)?;
            output::print_history(log.records(), args.output_format)
        }
        HistoryCommand::Show { id } => {
            let log = HistoryLog::load(store)?;
            let record = log.find(id)?;
            OutputHandler::for_record(record, args.output_format, needs_interactive_ui(args))
                .handle()
        }
        HistoryCommand::Delete { id } => {
            let removed = history::delete_record(store, id)?;
            println!("Análise {} ({}) removida.", removed.id, removed.month_year);
            Ok(())
        }
        HistoryCommand::Clear => {
            history::clear(store)?;
            println!("Histórico apagado.");
            Ok(())
        }
    }
}

// ──────────────────────────────────────────────────────────────
//  Templates
// ──────────────────────────────────────────────────────────────
fn list_templates(args: &Cli) -> Result<()> {
    let cfg_file = load_config_file(args)?;
    println!("Template Search Order:");
    println!("1. --template <path>");
    println!("2. [business|personal].template in the config file");
    for kind in [AnalysisType::Business, AnalysisType::Personal] {
        println!("3. User-global ({}): {}", kind.slug(), user_template_path(kind).display());
    }
    println!("4. Built-in Default");

    for kind in [AnalysisType::Business, AnalysisType::Personal] {
        let tpl_path = template_override(args, &cfg_file, kind);
        let (_, hash) = template::resolve_template(kind, tpl_path.as_deref())?;
        println!(
            "\nCurrently using for {}: {}",
            kind.slug(),
            if hash == "builtin" {
                "Built-in Default".to_string()
            } else {
                format!("Custom template (hash: {})", &hash[..12])
            }
        );
    }
    Ok(())
}

#[cfg(feature = "colors")]
fn colour<S: AsRef<str>>(s: S) -> ColoredString {
    s.as_ref().green()
}
#[cfg(not(feature = "colors"))]
fn colour<S: AsRef<str>>(s: S) -> String {
    s.as_ref().into()
}
