//! Test support: logging setup and small forest fixtures.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Forest, GroupPayload};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
    debug!("RUST_LOG={:?}", env::var("RUST_LOG").ok());
}

/// Build a forest from `(id, parent id)` pairs; the id doubles as the name.
///
/// Parents must be listed before their children.
///
/// # Panics
/// On duplicate ids or unknown parents; fixtures are expected to be well formed.
pub fn forest_from(edges: &[(&str, Option<&str>)]) -> Forest {
    let mut forest = Forest::new();
    for (id, parent) in edges {
        forest
            .insert(*id, GroupPayload::named(*id), *parent)
            .unwrap_or_else(|e| panic!("bad fixture {}: {}", id, e));
    }
    forest
}

/// Part of the sample organization used throughout the tests.
///
/// ```text
/// 1 Organization
/// ├── 1-1 Platform Group
/// │   ├── 1-1-1 Digital Marketing
/// │   │   ├── 1-1-1-1 Social Media
/// │   │   └── 1-1-1-2 SEO Optimization
/// │   └── 1-1-2 Web Platform
/// └── 1-2 Operations
/// 2 Partners
/// ```
pub fn sample_forest() -> Forest {
    let groups: [(&str, &str, Option<&str>, u32); 8] = [
        ("1", "Organization", None, 45),
        ("1-1", "Platform Group", Some("1"), 12),
        ("1-1-1", "Digital Marketing", Some("1-1"), 8),
        ("1-1-1-1", "Social Media", Some("1-1-1"), 3),
        ("1-1-1-2", "SEO Optimization", Some("1-1-1"), 2),
        ("1-1-2", "Web Platform", Some("1-1"), 4),
        ("1-2", "Operations", Some("1"), 6),
        ("2", "Partners", None, 1),
    ];
    let mut forest = Forest::new();
    for (id, name, parent, apps) in groups {
        let payload = GroupPayload {
            name: name.to_string(),
            description: Some(format!("{} group", name)),
            uuid: Some(format!("uuid-{}", id)),
            app_count: Some(apps),
            resource_count: Some(apps * 3),
        };
        forest
            .insert(id, payload, parent)
            .unwrap_or_else(|e| panic!("bad fixture {}: {}", id, e));
    }
    forest
}
