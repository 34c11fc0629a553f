//! The `brainplay init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("brainplay.toml").exists() {
        println!("brainplay.toml already exists, skipping.");
    } else {
        std::fs::write("brainplay.toml", SAMPLE_CONFIG)?;
        println!("Created brainplay.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit brainplay.toml to adjust scoring and question weights");
    println!("  2. Run: brainplay play --mode easy");
    println!("  3. Run: brainplay stats");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# brainplay configuration

data_dir = "data"
default_mode = "normal"
win_score = 50
correct_points = 10
wrong_points = -5

[question_weights]
square = 0.5
square_root = 0.5

[facts]
enabled = true
base_url = "http://numbersapi.com"
timeout_ms = 2000
max_len = 100
"#;
