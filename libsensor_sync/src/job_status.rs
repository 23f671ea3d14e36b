/// Progress message sent by the processor after each finished job
#[derive(Debug, Clone, Default)]
pub struct JobStatus {
    pub progress: f32,
    pub job: String,
}

impl JobStatus {
    pub fn new(progress: f32, job: &str) -> Self {
        Self {
            progress,
            job: job.to_string(),
        }
    }
}
