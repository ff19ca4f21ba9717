// tests/support/builders.rs
//! テスト用のレコード型・レジストリ・サービス構築ヘルパー
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;

use unique_slug::application::commands::records::CreateRecordCommand;
use unique_slug::application::dto::RecordDto;
use unique_slug::application::registry::SlugRegistry;
use unique_slug::application::services::ApplicationServices;
use unique_slug::domain::record::{RecordType, RecordWriteRepository, SlugLookup};
use unique_slug::domain::slug::{Constraint, SlugConfig};
use unique_slug::infrastructure::repositories::InMemoryRecordRepository;
use unique_slug::infrastructure::util::DefaultSlugGenerator;

fn record_type(name: &str) -> RecordType {
    RecordType::new(name).expect("valid record type")
}

pub static STANDARD: Lazy<RecordType> = Lazy::new(|| record_type("standard"));
pub static STANDARD_WITH_SCOPE: Lazy<RecordType> = Lazy::new(|| record_type("standard_with_scope"));
pub static CUSTOM: Lazy<RecordType> = Lazy::new(|| record_type("custom"));
pub static CUSTOM_COMPUTED: Lazy<RecordType> = Lazy::new(|| record_type("custom_computed"));
pub static SOFT_DELETABLE: Lazy<RecordType> = Lazy::new(|| record_type("soft_deletable"));
pub static VEHICLE: Lazy<RecordType> = Lazy::new(|| record_type("vehicle"));
pub static CAR: Lazy<RecordType> = Lazy::new(|| VEHICLE.subtype("car").expect("valid subtype"));
pub static TRUCK: Lazy<RecordType> = Lazy::new(|| VEHICLE.subtype("truck").expect("valid subtype"));

/// 全フィクスチャ型を設定済みのレジストリ
pub fn fixture_registry(lookup: Arc<dyn SlugLookup>) -> SlugRegistry {
    let mut registry = SlugRegistry::new(lookup, Arc::new(DefaultSlugGenerator));
    registry
        .configure(&STANDARD, SlugConfig::default())
        .expect("standard");
    registry
        .configure(&STANDARD_WITH_SCOPE, SlugConfig::new().scope_field("some_scope"))
        .expect("standard_with_scope");
    registry
        .configure(
            &CUSTOM,
            SlugConfig::new().slug_field("permalink").subject_field("name"),
        )
        .expect("custom");
    registry
        .configure(
            &CUSTOM_COMPUTED,
            SlugConfig::new().slug_field("permalink").subject_with(|record| {
                format!("zcvf {} zxvf", record.text("name").unwrap_or_default())
            }),
        )
        .expect("custom_computed");
    registry
        .configure(
            &SOFT_DELETABLE,
            SlugConfig::new().scope_with(|_| Ok(Constraint::is_null("deleted_at"))),
        )
        .expect("soft_deletable");
    registry
        .configure(&VEHICLE, SlugConfig::default())
        .expect("vehicle");
    registry
}

pub struct MemoryHarness {
    pub repo: Arc<InMemoryRecordRepository>,
    pub services: ApplicationServices,
}

pub fn memory_harness() -> MemoryHarness {
    let repo = Arc::new(InMemoryRecordRepository::new());
    let services = ApplicationServices::new(
        repo.clone(),
        repo.clone(),
        fixture_registry(repo.clone()),
        3,
    );
    MemoryHarness { repo, services }
}

/// `writes` を差し替えたハーネス（読み取りと検索はインメモリのまま）
pub fn harness_with_writes(
    repo: Arc<InMemoryRecordRepository>,
    writes: Arc<dyn RecordWriteRepository>,
    max_attempts: u32,
) -> ApplicationServices {
    ApplicationServices::new(writes, repo.clone(), fixture_registry(repo), max_attempts)
}

pub async fn create(
    services: &ApplicationServices,
    record_type: &RecordType,
    fields: &[(&str, Value)],
) -> RecordDto {
    let mut builder = CreateRecordCommand::builder().record_type(record_type.clone());
    for (name, value) in fields {
        builder = builder.field(*name, value.clone());
    }
    services
        .record_commands
        .create_record(builder.build().expect("command"))
        .await
        .expect("create record")
}

pub fn slug_of(dto: &RecordDto) -> &str {
    dto.slug.as_deref().expect("slug assigned")
}

pub fn id_of(dto: &RecordDto) -> i64 {
    dto.id.expect("persisted record has an id")
}
