//! Sample tasks for `--demo` runs against the in-memory backend.

use anyhow::Result;

use crate::capture::CaptureInput;
use crate::core::TaskStore;

pub(crate) struct SampleSeed {
    pub text: &'static str,
    pub description: Option<&'static str>,
    pub scheduled: Option<&'static str>,
    pub completed: bool,
}

pub(crate) const SAMPLE_SEEDS: &[SampleSeed] = &[
    SampleSeed {
        text: "Renew passport",
        description: Some("Photos are in the top drawer"),
        scheduled: Some("+2w"),
        completed: false,
    },
    SampleSeed {
        text: "Water the plants",
        description: None,
        scheduled: Some("today"),
        completed: true,
    },
    SampleSeed {
        text: "Call the dentist",
        description: None,
        scheduled: Some("tomorrow"),
        completed: false,
    },
    SampleSeed {
        text: "Plan weekend hike",
        description: Some("Check the forecast first"),
        scheduled: None,
        completed: false,
    },
    SampleSeed {
        text: "Buy milk",
        description: None,
        scheduled: Some("today"),
        completed: false,
    },
];

/// Fill an empty store with [`SAMPLE_SEEDS`]; returns whether anything was added.
pub async fn seed_sample_tasks(store: &TaskStore) -> Result<bool> {
    store.refresh(None).await?;
    if store.with_tasks(|tasks| !tasks.is_empty()) {
        return Ok(false);
    }

    for seed in SAMPLE_SEEDS {
        let input = CaptureInput {
            text: seed
                .text
                .split_whitespace()
                .map(|piece| piece.to_string())
                .collect(),
            description: seed.description.map(str::to_string),
            scheduled: seed.scheduled.map(str::to_string),
        };
        let task = store.create(input.into_new_task()?).await?;
        if seed.completed {
            store.toggle_status(&task.id).await?;
        }
    }
    tracing::debug!(count = SAMPLE_SEEDS.len(), "seeded demo tasks");
    Ok(true)
}
