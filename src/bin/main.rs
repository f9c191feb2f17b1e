use fincoach_engine::{
    config::EngineConfig,
    models::{FinancialSnapshot, Goal},
    Credential, FinCoachEngine,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs the engine once against a sample profile.
///
/// Usage: `fincoach [query]`. The bearer token is read from `FINCOACH_TOKEN`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::from_env()?;
    let engine = FinCoachEngine::from_config(config)?;

    let credential = std::env::var("FINCOACH_TOKEN")
        .map(Credential::bearer)
        .unwrap_or_else(|_| Credential::anonymous());

    let query = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let query = if query.trim().is_empty() {
        "Can I afford a 40000 purchase?".to_string()
    } else {
        query
    };

    let snapshot = FinancialSnapshot::new(85000.0, 52000.0, 240000.0, 742).with_goals(vec![
        Goal::new("g1", "Emergency fund", 150000.0, 300000.0),
        Goal::new("g2", "Europe trip", 40000.0, 200000.0),
    ]);

    info!(query = %query, "Running FinCoach engine");

    let (score, band, _) = engine.score_report(&snapshot);
    println!("\n=== HEALTH ===");
    println!("Score: {} ({})", score, band);
    for goal in &snapshot.goals {
        println!("  {}: {}%", goal.name, goal.progress_percent());
    }

    let simulation = engine
        .simulate_with_advisory(&snapshot, 40000.0, 6, &credential)
        .resolve()
        .await;
    println!("\n=== WHAT-IF: 40000 ===");
    println!("Safe: {}", if simulation.safe { "Likely safe" } else { "Risky" });
    println!("Savings impact: {}%", simulation.impact_percent);
    println!("Estimated goal delay: {} months", simulation.delay_estimate);
    println!("New balance (immediate): {}", simulation.immediate_balance);
    println!("Projection: {:?}", simulation.projected_balance);
    if let Some(advice) = &simulation.advisory {
        println!("Advisor: {}", advice);
    }

    let result = engine.reason(&snapshot, &query, &credential).await;
    println!("\n=== REASONING TRACE ===");
    let mut steps = engine.reveal(result.steps);
    let mut i = 0;
    while let Some(step) = steps.recv().await {
        i += 1;
        println!("  {}: {}", i, step);
    }
    println!("\n{}", result.response);

    let anomalies = engine.fetch_anomalies(&credential).await;
    if !anomalies.is_empty() {
        println!("\n=== ALERTS ===");
        for anomaly in anomalies {
            println!("  {}: {}", anomaly.kind, anomaly.reason);
        }
    }

    Ok(())
}
