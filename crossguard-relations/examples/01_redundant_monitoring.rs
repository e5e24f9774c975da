//! Redundant speed monitoring from a JSON model
//!
//! Speed is measured by a radar, derived from the wheel rate and derived from
//! GPS. At tick 5 the wheel slips and reports twice its real rate.
//!
//! Run with:
//! ```sh
//! cargo run -p crossguard-relations --example 01_redundant_monitoring [model.json]
//! ```

use crossguard_core::{BayesMode, Interval, Itom, Itoms, Monitor, MonitorConfig};
use crossguard_relations::KnowledgeBase;

const SPEED_MODEL: &str = include_str!("../models/speed.json");

fn readings(tick: u32) -> Itoms {
    let speed = 10.0 + 0.5 * f64::from(tick);
    let slip = if tick == 5 { 2.0 } else { 1.0 };
    let t = f64::from(tick);

    vec![
        Itom::new("radar", Interval::around(speed, 0.2), "speed").with_timestamp(t),
        Itom::new("wheel", Interval::around(4.0 * speed * slip, 0.4), "wheel_rate").with_timestamp(t),
        Itom::new("gps", Interval::around(3.6 * speed, 1.0), "gps_speed").with_timestamp(t),
    ]
    .into_iter()
    .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let knowledge = match std::env::args().nth(1) {
        Some(path) => {
            let mut knowledge = KnowledgeBase::new();
            knowledge.load(&path)?;
            knowledge
        }
        None => KnowledgeBase::from_json(SPEED_MODEL)?,
    };
    print_model(&knowledge);

    let config = MonitorConfig::default().with_bayes(BayesMode::Soft);
    let mut monitor = Monitor::new_with_config(knowledge, "speed", &readings(0), config)?;

    println!("\nSubstitutions:");
    for (index, substitution) in monitor.substitutions().unwrap_or_default().iter().enumerate() {
        println!("  [{}] {}", index, substitution);
    }

    println!("\nTicks:");
    for tick in 0..10 {
        match monitor.monitor(&readings(tick))? {
            None => println!("  t={:<2} ok", tick),
            Some(fault) => println!("  t={:<2} {} -> check {:?}", tick, fault, fault.failed_itoms()),
        }
    }
    Ok(())
}

fn print_model(knowledge: &KnowledgeBase) {
    println!("Model:");
    for fact in knowledge.facts() {
        println!("  {}", fact);
    }
}
