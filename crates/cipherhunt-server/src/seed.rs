//! Embedded demo catalog.
//!
//! A JSON manifest compiled into the module and loaded on demand, so a
//! fresh deployment can be played without hand-entering levels, questions,
//! and hints through the catalog reducers.

use crate::tables::*;
use serde::Deserialize;
use spacetimedb::{reducer, ReducerContext, Table};

const CATALOG_JSON: &str = include_str!("../../../data/catalog_seed.json");

#[derive(Debug, Deserialize)]
struct LevelSeed {
    level: u32,
    questions: Vec<QuestionSeed>,
}

#[derive(Debug, Deserialize)]
struct QuestionSeed {
    title: String,
    description: String,
    correct_code: String,
    #[serde(default)]
    hints: Vec<HintSeed>,
}

#[derive(Debug, Deserialize)]
struct HintSeed {
    text: String,
    unlock_minutes: u32,
}

/// Load the embedded demo catalog. Refused when any levels already exist,
/// so it can never clobber a hand-built catalog.
#[reducer]
pub fn seed_catalog(ctx: &ReducerContext) -> Result<(), String> {
    if ctx.db.level().count() > 0 {
        return Err("Catalog is not empty".to_string());
    }
    let seeds: Vec<LevelSeed> = serde_json::from_str(CATALOG_JSON)
        .map_err(|e| format!("catalog_seed.json is invalid: {}", e))?;

    for (idx, seed) in seeds.iter().enumerate() {
        // Level numbers in the manifest must be dense from 1.
        if seed.level != (idx + 1) as u32 {
            return Err(format!(
                "catalog_seed.json levels must be dense: position {} has level {}",
                idx + 1,
                seed.level
            ));
        }
        ctx.db.level().insert(Level {
            id: 0,
            number: seed.level,
        });
        for q in &seed.questions {
            let question = ctx.db.question().insert(Question {
                id: 0,
                level_number: seed.level,
                title: q.title.clone(),
                description: q.description.clone(),
                correct_code: q.correct_code.clone(),
            });
            ctx.db.question_card().insert(QuestionCard {
                id: question.id,
                level_number: seed.level,
                title: q.title.clone(),
                description: q.description.clone(),
            });
            for (ord, h) in q.hints.iter().enumerate() {
                ctx.db.hint().insert(Hint {
                    id: 0,
                    question_id: question.id,
                    ord: ord as u32,
                    text: h.text.clone(),
                    revealed: false,
                    unlock_minutes: h.unlock_minutes,
                });
            }
        }
    }
    log::info!("Seeded catalog: {} levels", seeds.len());
    Ok(())
}
