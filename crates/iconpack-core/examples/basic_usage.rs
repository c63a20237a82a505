//! Basic usage example - list the icon packs of a web root

use iconpack_core::{IconPackManager, Result};

fn main() -> Result<()> {
    // Get path from args or use current directory
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());

    println!("Scanning {} for *.icons.yml", root);

    let manager = IconPackManager::builder(&root).build()?;
    let options = manager.list_pack_options(true)?;

    if options.is_empty() {
        println!("No icon packs with icons found.");
    } else {
        println!("Found {} packs:", options.len());
        for (pack_id, label) in options {
            println!("  - {} ({})", label, pack_id);
        }
    }

    Ok(())
}
