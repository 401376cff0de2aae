use anyhow::Result;

use crate::config::Config;

/// Print the content types a reindex run would discover, with their
/// provider table mappings and indexability.
pub fn list_types(config: &Config) -> Result<()> {
    println!("{:<16} {:<20} {:<10} COMMENTS", "TYPE", "TABLE", "INDEXABLE");

    let builtin = &config.reindex.builtin_type;
    let excluded = &config.reindex.comment_excluded_types;

    let comments_of = |ty: &str| -> &str {
        if excluded.iter().any(|e| e == ty) {
            "excluded"
        } else if config.comments.is_some() {
            "fan-out"
        } else {
            "none"
        }
    };

    match config.providers.get(builtin) {
        Some(p) => println!(
            "{:<16} {:<20} {:<10} {}",
            builtin,
            p.table,
            p.indexable,
            comments_of(builtin)
        ),
        None => println!(
            "{:<16} {:<20} {:<10} {}",
            builtin,
            "NOT CONFIGURED",
            false,
            comments_of(builtin)
        ),
    }

    for (name, provider) in &config.providers {
        if name == builtin {
            continue;
        }
        println!(
            "{:<16} {:<20} {:<10} {}",
            name,
            provider.table,
            provider.indexable,
            comments_of(name)
        );
    }

    Ok(())
}
