use super::*;

use std::sync::mpsc;

pub(crate) enum Job {
    AnswerCallback(String),
    Deliver(Reply),
}

/// Hands replies to a dedicated thread that owns the blocking Bot API
/// client. Without a bot token the thread only logs what it would send.
#[derive(Clone)]
pub(crate) struct Courier {
    tx: mpsc::Sender<Job>,
}

impl Courier {
    pub(crate) fn spawn(api_base: &str, bot_token: Option<String>) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let api_base = api_base.to_string();

        std::thread::Builder::new()
            .name("tfs-delivery".to_string())
            .spawn(move || {
                let client = match bot_token {
                    Some(token) => match TelegramClient::new(&api_base, &token) {
                        Ok(client) => Some(client),
                        Err(err) => {
                            error!(error = %format!("{:#}", err), "telegram client unavailable, dry run");
                            None
                        }
                    },
                    None => None,
                };
                for job in rx {
                    run_job(client.as_ref(), job);
                }
            })
            .context("spawn delivery thread")?;

        Ok(Self { tx })
    }

    pub(crate) fn send(&self, job: Job) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| anyhow!("delivery worker stopped"))
    }
}

fn run_job(client: Option<&TelegramClient>, job: Job) {
    let Some(client) = client else {
        match job {
            Job::AnswerCallback(id) => debug!(callback_id = %id, "dry run: answer callback"),
            Job::Deliver(reply) => info!(
                user_id = reply.user_id(),
                reply = %serde_json::to_string(&reply).unwrap_or_default(),
                "dry run: reply"
            ),
        }
        return;
    };

    let res = match &job {
        Job::AnswerCallback(id) => client.answer_callback(id),
        Job::Deliver(reply) => client.deliver(reply),
    };
    if let Err(err) = res {
        error!(error = %format!("{:#}", err), "delivery failed");
    }
}
