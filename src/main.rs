use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::rc::Rc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use trust_engine::{
    DefinitionSet, JsonFileGateway, MemoryGateway, PermissionDecision, PersistenceGateway,
    SystemClock, TrustConfig, TrustManager,
};

/// Trust engine host
///
/// Loads definitions and the local profile, runs one expiry pass, executes a
/// single command and saves the profile on the way out. Settings come from
/// `TRUST_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "trust-engine")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show faction, score, rank and held certifications
    Status,
    /// Check (and audit) a permission
    Check { permission: String },
    /// Grant a certification
    Grant { cert_id: String },
    /// Revoke a certification
    Revoke { cert_id: String },
    /// Re-activate a held certification
    Activate { cert_id: String },
    /// Deactivate a held certification
    Deactivate { cert_id: String },
    /// Switch faction (resets trust and deactivates certifications)
    Faction { name: String },
    /// Add to (or subtract from) the trust score
    Adjust {
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Print the audit entries recorded during this run
    Audit {
        #[arg(short, long, default_value = "20")]
        count: usize,
    },
    /// Discard the profile and start over
    Reset,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TrustConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        eprintln!("Please check TRUST_* environment variables.");
        e
    })?;

    init_logging(&config)?;

    let definitions = DefinitionSet::from_file(&config.definitions.path).with_context(|| {
        format!(
            "Cannot start without definitions ({})",
            config.definitions.path.display()
        )
    })?;
    let catalog = definitions.into_catalog();
    info!(
        certs = catalog.cert_count(),
        ranks = catalog.ranks().len(),
        "Certification catalog loaded"
    );

    let gateway: Box<dyn PersistenceGateway> = if config.profile.persistence_enabled {
        Box::new(JsonFileGateway::new(config.profile.snapshot_path.clone()))
    } else {
        info!("Persistence disabled; profile lives in memory for this run");
        Box::new(MemoryGateway::new())
    };

    let mut manager = TrustManager::bootstrap(&config, catalog, gateway, Rc::new(SystemClock));
    manager.recompute_expiration();

    run_command(&mut manager, args.command.unwrap_or(Command::Status));

    manager.shutdown();
    Ok(())
}

fn run_command(manager: &mut TrustManager, command: Command) {
    match command {
        Command::Status => print_status(manager),
        Command::Check { permission } => {
            let decision = manager.can(&permission);
            let allowed = manager.require(&permission);
            if let PermissionDecision::Allowed { cert_id } = &decision {
                manager.mark_certification_used(cert_id.as_str());
            }
            println!(
                "{}: {}",
                permission,
                if allowed { "allowed" } else { decision.reason() }
            );
        }
        Command::Grant { cert_id } => {
            report(&cert_id, "granted", manager.grant_certification(&cert_id))
        }
        Command::Revoke { cert_id } => {
            report(&cert_id, "revoked", manager.revoke_certification(&cert_id))
        }
        Command::Activate { cert_id } => report(
            &cert_id,
            "activated",
            manager.set_certification_active(&cert_id, true),
        ),
        Command::Deactivate { cert_id } => report(
            &cert_id,
            "deactivated",
            manager.set_certification_active(&cert_id, false),
        ),
        Command::Faction { name } => {
            if manager.set_faction(name.as_str()) {
                println!("faction changed to {}", name);
            } else {
                println!("already in faction {}", name);
            }
        }
        Command::Adjust { delta } => {
            let score = manager.adjust_trust_score(delta);
            println!("trust score {} (rank {})", score, manager.state().rank_id());
        }
        Command::Audit { count } => {
            for entry in manager.audit().recent(count).iter().rev() {
                println!(
                    "{} {:<18} {} {}",
                    entry.timestamp.to_rfc3339(),
                    entry.action.as_str(),
                    entry.faction,
                    entry.payload
                );
            }
        }
        Command::Reset => {
            manager.reset_profile();
            println!("profile reset");
        }
    }
}

fn report(cert_id: &str, verb: &str, ok: bool) {
    if ok {
        println!("{} {}", cert_id, verb);
    } else {
        println!("{} not {} (unknown, not held, or expired)", cert_id, verb);
    }
}

fn print_status(manager: &TrustManager) {
    let state = manager.state();
    println!("player   {}", state.player_id());
    println!("faction  {}", state.faction());
    println!("trust    {}", state.trust_score());
    println!("rank     {}", state.rank_id());
    println!(
        "baseline {} ({} certs defined)",
        manager.baseline_cert_id(),
        manager.catalog().cert_count()
    );
    for record in state.records() {
        let status = if record.is_expired {
            "expired"
        } else if record.is_active {
            "active"
        } else {
            "inactive"
        };
        println!(
            "  {:<24} tier {:<3} v{:<3} {:<9} {}",
            record.cert_id, record.tier, record.version_earned, status, record.ladder_id
        );
    }
}

fn init_logging(config: &TrustConfig) -> Result<()> {
    let log_level = match config.logging.level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };
    let filter = EnvFilter::from_default_env().add_directive(log_level.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if config.logging.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
