use super::evolution_engine::ProgressCallback;
use crate::types::GenerationRecord;
use std::sync::mpsc::Sender;

/// Logs every event at info level
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::info!("Generation {} starting...", generation + 1);
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        log::info!(
            "Generation {} complete. Best fitness: {:.4}, average: {:.4}",
            record.generation + 1,
            record.best,
            record.avg
        );
    }

    fn on_final_evaluation(&mut self, record: &GenerationRecord) {
        log::info!(
            "Final population after {} generations. Best fitness: {:.4}, average: {:.4}",
            record.generation,
            record.best,
            record.avg
        );
    }
}

// For callers consuming progress on another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete(GenerationRecord),
    FinalEvaluation(GenerationRecord),
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete(*record));
    }

    fn on_final_evaluation(&mut self, record: &GenerationRecord) {
        let _ = self.sender.send(ProgressMessage::FinalEvaluation(*record));
    }
}
