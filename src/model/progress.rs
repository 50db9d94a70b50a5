//! Server-owned progress: the stored percentage follows from the completed module set.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("Progress value is required")]
    Missing,
    #[error("Progress must be between 0 and 100, got {0}")]
    OutOfRange(i32),
    #[error("Module {0} does not belong to this course")]
    UnknownModule(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedProgress {
    pub progress: i32,
    pub completed_modules: Vec<Uuid>,
}

/// Merges a client update into the current state.
///
/// `completed_modules` is treated as a set (first occurrence wins) and each id
/// must be one of `course_modules`. With modules present the percentage is
/// derived from the set and a supplied `progress` only gets its bounds checked;
/// a course without modules stores the supplied value as is.
pub fn derive_progress(
    requested_progress: Option<i32>,
    requested_modules: Option<Vec<Uuid>>,
    current_progress: i32,
    current_modules: &[Uuid],
    course_modules: &[Uuid],
) -> Result<DerivedProgress, ProgressError> {
    if requested_progress.is_none() && requested_modules.is_none() {
        return Err(ProgressError::Missing);
    }

    if let Some(progress) = requested_progress {
        if !(0..=100).contains(&progress) {
            return Err(ProgressError::OutOfRange(progress));
        }
    }

    let candidates = requested_modules.unwrap_or_else(|| current_modules.to_vec());
    let mut completed_modules = Vec::with_capacity(candidates.len());
    for id in candidates {
        if !course_modules.contains(&id) {
            return Err(ProgressError::UnknownModule(id));
        }
        if !completed_modules.contains(&id) {
            completed_modules.push(id);
        }
    }

    let progress = if course_modules.is_empty() {
        requested_progress.unwrap_or(current_progress)
    } else {
        percentage(completed_modules.len(), course_modules.len())
    };

    Ok(DerivedProgress {
        progress,
        completed_modules,
    })
}

fn percentage(done: usize, total: usize) -> i32 {
    let done = done.min(total) as i64;
    let total = total as i64;
    ((done * 100 + total / 2) / total) as i32
}
