use cell_cli::{AnalysisConfig, VisionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Cellscope configuration demo");
    println!("============================\n");

    let presets = [
        VisionConfig::default().with_metadata("Standard", "5x5 blur, 2px boundaries"),
        VisionConfig::microscopy_preset(),
        VisionConfig::fine_detail_preset(),
    ];
    for preset in &presets {
        println!("  {}", preset.summary());
    }

    let dir = std::env::temp_dir().join("cellscope-config-demo");
    std::fs::create_dir_all(&dir)?;

    let mut run = AnalysisConfig::new("data/focal9.tif", "output");
    run.vision = presets[1].clone();
    run.n_threads = 4;

    let toml_path = dir.join("microscopy.toml");
    run.save_toml(&toml_path)?;
    println!("\nTOML written to {}:\n{}", toml_path.display(), run.to_toml()?);

    let json_path = dir.join("microscopy.json");
    std::fs::write(&json_path, run.to_json()?)?;

    let from_toml = AnalysisConfig::load(&toml_path)?;
    let from_json = AnalysisConfig::load(&json_path)?;
    assert_eq!(from_toml, run);
    assert_eq!(from_json, run);
    println!("Reloaded: {}", from_json.summary());

    Ok(())
}
