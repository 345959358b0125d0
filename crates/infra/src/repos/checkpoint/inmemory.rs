use super::ICheckpointRepo;
use pirouette_domain::StreamCheckpoint;

pub struct InMemoryCheckpointRepo {
    checkpoints: std::sync::Mutex<Vec<StreamCheckpoint>>,
}

impl InMemoryCheckpointRepo {
    pub fn new() -> Self {
        Self {
            checkpoints: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ICheckpointRepo for InMemoryCheckpointRepo {
    async fn find(&self, name: &str) -> anyhow::Result<Option<StreamCheckpoint>> {
        let checkpoints = self.checkpoints.lock().unwrap();
        Ok(checkpoints.iter().find(|c| c.name == name).cloned())
    }

    async fn save(&self, checkpoint: &StreamCheckpoint) -> anyhow::Result<()> {
        let mut checkpoints = self.checkpoints.lock().unwrap();
        match checkpoints.iter_mut().find(|c| c.name == checkpoint.name) {
            Some(existing) => *existing = checkpoint.clone(),
            None => checkpoints.push(checkpoint.clone()),
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> anyhow::Result<()> {
        let mut checkpoints = self.checkpoints.lock().unwrap();
        checkpoints.retain(|c| c.name != name);
        Ok(())
    }
}
