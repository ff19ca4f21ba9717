use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unique_slug::{
    application::{
        commands::records::CreateRecordCommand, registry::SlugRegistry,
        services::ApplicationServices,
    },
    config::AppConfig,
    domain::{record::RecordType, slug::SlugConfig},
    infrastructure::{database, repositories::SqliteRecordRepository, util::DefaultSlugGenerator},
};

const USAGE: &str = "usage: unique_slug <type[/subtype...]> [--scope-field <field> <value>] <subject>...";

struct Args {
    record_type: RecordType,
    scope: Option<(String, String)>,
    subjects: Vec<String>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args> {
    let type_path = raw.next().context(USAGE)?;
    let mut segments = type_path.split('/');
    let mut record_type = RecordType::new(segments.next().unwrap_or_default())?;
    for segment in segments {
        record_type = record_type.subtype(segment)?;
    }

    let mut scope = None;
    let mut subjects = Vec::new();
    while let Some(arg) = raw.next() {
        if arg == "--scope-field" {
            let field = raw.next().context(USAGE)?;
            let value = raw.next().context(USAGE)?;
            scope = Some((field, value));
        } else {
            subjects.push(arg);
        }
    }
    if subjects.is_empty() {
        bail!(USAGE);
    }

    Ok(Args {
        record_type,
        scope,
        subjects,
    })
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = parse_args(std::env::args().skip(1))?;
    let config = AppConfig::from_env()?;

    let pool = database::init_pool(config.database_url(), config.database_max_connections()).await?;
    database::run_migrations(&pool).await?;
    let repo = Arc::new(SqliteRecordRepository::new(Arc::new(pool)));

    let root = RecordType::new(args.record_type.root())?;
    let mut slug_config = SlugConfig::default();
    if let Some((field, _)) = &args.scope {
        slug_config = slug_config.scope_field(field.clone());
    }
    let mut registry = SlugRegistry::new(repo.clone(), Arc::new(DefaultSlugGenerator));
    registry.configure(&root, slug_config)?;

    let services = ApplicationServices::new(
        repo.clone(),
        repo.clone(),
        registry,
        config.save_max_attempts(),
    );

    for subject in args.subjects {
        let mut builder = CreateRecordCommand::builder()
            .record_type(args.record_type.clone())
            .field("title", subject);
        if let Some((field, value)) = &args.scope {
            builder = builder.field(field.clone(), value.clone());
        }
        let command = builder.build().map_err(anyhow::Error::msg)?;
        let created = services.record_commands.create_record(command).await?;
        println!("{}", serde_json::to_string(&created)?);
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sqlx=warn".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}
