//! Business constants shared across pipeline stages.
//! Every value here is part of the ranking contract; changing one changes which
//! companies survive and how they are ordered.

// Registry (data.gov.in company master data)
pub const REGISTRY_BASE_URL: &str =
    "https://api.data.gov.in/resource/4dbe5667-7b6b-41d7-82af-211562424d9a";
pub const REGISTRY_REGION_FILTER: &str = "filters[CompanyStateCode]";
pub const REGISTRY_PAGE_SIZE: u32 = 100;

// Research API
pub const RESEARCH_API_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const RESEARCH_MODEL: &str = "sonar-pro";
pub const RESEARCH_TIMEOUT_SECS: u64 = 30;
pub const RESEARCH_MAX_OUTPUT_TOKENS: u32 = 200;

// Raw registry field names
pub const FIELD_CIN: &str = "CIN";
pub const FIELD_COMPANY_NAME: &str = "CompanyName";
pub const FIELD_ROC_CODE: &str = "CompanyROCcode";
pub const FIELD_CATEGORY: &str = "CompanyCategory";
pub const FIELD_REGISTRATION_DATE: &str = "CompanyRegistrationdate_date";
pub const FIELD_STATUS: &str = "CompanyStatus";
pub const FIELD_STATE_CODE: &str = "CompanyStateCode";
pub const FIELD_INDUSTRIAL_CLASSIFICATION: &str = "CompanyIndustrialClassification";

// Enrichment field names
pub const FIELD_SIZE: &str = "size";
pub const FIELD_LD_ACTIVE: &str = "L&D_active";
pub const FIELD_SERVICES_PROVIDED: &str = "services_provided";
pub const FIELD_SERVICE_CATEGORIES: &str = "service_categories";
pub const FIELD_SCORE: &str = "score";
/// Decision makers sourced from upstream data; restored after every merge
pub const FIELD_UPSTREAM_DECISION_MAKERS: &str = "top_directors";

// Filter/Normalize
pub const TARGET_CATEGORY: &str = "BUSINESS SERVICES";
pub const IT_CIN_PREFIXES: &[&str] = &[
    "U72200", "U72300", "U72400", "U72900", "U62099", "U62091", "L72200",
];
pub const IT_NAME_KEYWORDS: &[&str] = &[
    "TECHNOLOGY",
    "INFORMATION TECHNOLOGY",
    "SYSTEMS",
    "SOFTWARE",
    "AI",
    "PLATFORM",
    "ANALYTICS",
];

// Enrichment
/// Leading records enriched per invocation; bounds research API spend.
pub const ENRICHMENT_QUOTA: usize = 5;
pub const OTHER_SERVICE_CATEGORY: &str = "Other / Misc";
/// Keywords are matched verbatim against the lowercased service text, so the
/// uppercase "IT" entry never fires. Kept for parity with published rankings.
pub const SERVICE_CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("Software Development", &["software", "app", "development", "saas"]),
    ("Cloud Services", &["cloud", "aws", "azure", "gcp", "server"]),
    ("Consulting / Service", &["consulting", "service", "advisory", "IT"]),
    ("Product-Based", &["product", "platform", "solution"]),
];

// Scoring
pub const DEFAULT_TARGET_CATEGORIES: &str = "Software Development,Cloud Services,service";
pub const SIZE_TIERS: &[(&str, u8)] = &[("Small", 1), ("Medium", 2), ("Large", 3)];
pub const BASELINE_SIZE_TIER: u8 = 1;
pub const MAX_SIZE_TIER: u8 = 3;
pub const LD_WEIGHT: f64 = 0.40;
pub const SIZE_WEIGHT: f64 = 0.35;
pub const SERVICE_WEIGHT: f64 = 0.25;
pub const TOP_N: usize = 5;

// Artifact layout: (local staging folder, blob key folder, file stem)
pub const RAW_LOCAL_FOLDER: &str = "unprocessedList";
pub const RAW_KEY_FOLDER: &str = "unprocessedList";
pub const CLEAN_LOCAL_FOLDER: &str = "processedList";
pub const CLEAN_KEY_FOLDER: &str = "processed";
pub const CLEAN_FILE_STEM: &str = "clean_it_companies";
pub const ENRICHED_LOCAL_FOLDER: &str = "enrichedList";
pub const ENRICHED_KEY_FOLDER: &str = "enrichedList";
pub const ENRICHED_FILE_STEM: &str = "enriched_business_services";
pub const SCORED_LOCAL_FOLDER: &str = "scoredList";
pub const SCORED_KEY_FOLDER: &str = "scoredList";
pub const SCORED_FILE_STEM: &str = "scored_companies";
pub const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
