use bevy::prelude::*;

/// Loading progress shared with the frontend overlay.
///
/// Stage entries mirror what the embedding UI renders; `dirty` flags a
/// pending notification.
#[derive(Resource, Default)]
pub struct LoadingProgress {
    pub manifest_loaded: bool,
    pub active_url: Option<String>,
    pub stages: Vec<(String, i32)>,
    pub dirty: bool,
}

impl LoadingProgress {
    pub fn begin_model(&mut self, url: &str) {
        self.active_url = Some(url.to_string());
        self.stages = vec![
            (String::from("Model"), 0),
            (String::from("Materials"), 0),
            (String::from("Framing"), 0),
        ];
        self.dirty = true;
    }

    /// Mark a named stage done, inserting it if a system reports a stage
    /// the overlay does not know yet.
    pub fn stage_done(&mut self, name: &str) {
        match self.stages.iter_mut().find(|(stage, _)| stage == name) {
            Some((_, done)) => *done = 1,
            None => self.stages.push((name.to_string(), 1)),
        }
        self.dirty = true;
    }

    /// Clear the active load after a failure or cancellation.
    pub fn finish_model(&mut self) {
        self.active_url = None;
        self.stages.clear();
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_model_resets_stages() {
        let mut progress = LoadingProgress::default();
        progress.begin_model("models/helmet.glb");
        assert_eq!(progress.active_url.as_deref(), Some("models/helmet.glb"));
        assert!(progress.stages.iter().all(|(_, done)| *done == 0));
        assert!(progress.dirty);
    }

    #[test]
    fn stage_done_upserts() {
        let mut progress = LoadingProgress::default();
        progress.begin_model("models/helmet.glb");
        progress.dirty = false;
        progress.stage_done("Model");
        progress.stage_done("Environment");
        assert!(progress.dirty);
        assert_eq!(
            progress.stages.iter().filter(|(_, done)| *done == 1).count(),
            2
        );
        assert_eq!(progress.stages.len(), 4);
    }
}
