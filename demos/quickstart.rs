//! Analyze a three-arm ad experiment and print the budget split.

use allot::{analyze_seeded, EngineConfig, VariantStats};

fn main() {
    let arms = vec![
        VariantStats {
            id: "control".to_string(),
            impressions: 12_000,
            clicks: 360,
            conversions: 41,
            spend: 540.0,
            revenue: 1_230.0,
            is_control: true,
        },
        VariantStats {
            id: "video".to_string(),
            impressions: 11_500,
            clicks: 437,
            conversions: 52,
            spend: 520.0,
            revenue: 1_610.0,
            is_control: false,
        },
        VariantStats::new("carousel", 900, 30),
    ];

    let cfg = EngineConfig::default();
    let result = match analyze_seeded(&arms, &cfg, 42) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("analysis failed: {e}");
            std::process::exit(1);
        }
    };

    println!("{:<10} {:>8} {:>8} {:>10} {:>7}", "arm", "ctr", "p(best)", "budget %", "roas");
    for v in &arms {
        let roas = v
            .return_on_ad_spend()
            .map_or_else(|| "-".to_string(), |r| format!("{r:.2}"));
        println!(
            "{:<10} {:>8.4} {:>8.3} {:>10.1} {:>7}",
            v.id,
            v.ctr(),
            result.win_probability[&v.id],
            result.allocation[&v.id],
            roas
        );
    }

    if let Some(s) = &result.significance {
        println!(
            "\n{} vs {}: z = {:.3}, p = {:.4} ({})",
            s.challenger,
            s.control,
            s.z_statistic,
            s.p_value,
            if s.is_significant { "significant" } else { "not significant" }
        );
    }
    println!(
        "recommendation: {:?} (confidence {:.3})",
        result.recommendation.action, result.recommendation.confidence
    );
    for note in &result.notes {
        println!("note: {note:?}");
    }
}
