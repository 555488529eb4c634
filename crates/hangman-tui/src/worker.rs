//! Background thread for leaderboard calls
//!
//! Store calls can block on the network, so the UI hands them to one worker
//! thread and polls for replies each frame. Jobs run in submission order,
//! which keeps this process's own reads and writes from interleaving.

use crate::config::PlayerConfig;
use hangman_core::{LeaderboardClient, RankedScore};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
#[cfg(test)]
use std::time::Duration;

enum Job {
    Record { score: u32 },
    Fetch,
}

/// What the worker reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Scores(Vec<RankedScore>),
    FetchFailed(String),
    Recorded { score: u32, ok: bool },
}

pub struct LeaderboardWorker {
    jobs: Option<Sender<Job>>,
    replies: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
    backend_name: &'static str,
}

impl LeaderboardWorker {
    pub fn spawn(client: LeaderboardClient, player: PlayerConfig) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        let backend_name = client.backend_name();

        let handle = thread::Builder::new()
            .name("leaderboard".into())
            .spawn(move || run(client, player, job_rx, reply_tx))?;

        Ok(Self {
            jobs: Some(job_tx),
            replies: reply_rx,
            handle: Some(handle),
            backend_name,
        })
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    /// Queue a finished game's score
    pub fn record(&self, score: u32) {
        self.submit(Job::Record { score });
    }

    /// Queue a ranking read
    pub fn fetch(&self) {
        self.submit(Job::Fetch);
    }

    fn submit(&self, job: Job) {
        let sent = self.jobs.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !sent {
            tracing::warn!("leaderboard worker is gone; dropping job");
        }
    }

    /// Next reply, if one has arrived
    pub fn try_recv(&self) -> Option<Reply> {
        self.replies.try_recv().ok()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Reply> {
        self.replies.recv_timeout(timeout).ok()
    }
}

impl Drop for LeaderboardWorker {
    fn drop(&mut self) {
        // Closing the queue lets the thread finish pending writes and exit
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("leaderboard worker panicked");
            }
        }
    }
}

fn run(
    client: LeaderboardClient,
    player: PlayerConfig,
    jobs: Receiver<Job>,
    replies: Sender<Reply>,
) {
    for job in jobs {
        let reply = match job {
            Job::Record { score } => {
                if let Err(e) = client.ensure_profile(
                    &player.user_id,
                    player.username.as_deref(),
                    player.email.as_deref(),
                ) {
                    tracing::warn!("could not store player profile: {e}");
                }
                let ok = client.record_score(&player.user_id, score);
                Reply::Recorded { score, ok }
            }
            Job::Fetch => match client.fetch_ranked_scores() {
                Ok(scores) => Reply::Scores(scores),
                Err(e) => {
                    tracing::error!("error loading leaderboard: {e}");
                    Reply::FetchFailed(e.to_string())
                }
            },
        };
        // The UI may already be gone; that's fine
        let _ = replies.send(reply);
    }
    tracing::debug!("leaderboard worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangman_core::MemoryStore;
    use std::sync::Arc;

    const WAIT: Duration = Duration::from_secs(5);

    fn player() -> PlayerConfig {
        PlayerConfig {
            user_id: "p1".into(),
            username: Some("Pia".into()),
            email: None,
        }
    }

    #[test]
    fn test_record_then_fetch_in_order() {
        let store = Arc::new(MemoryStore::new());
        let worker =
            LeaderboardWorker::spawn(LeaderboardClient::new(store.clone()), player()).unwrap();
        assert_eq!(worker.backend_name(), "Memory");

        worker.record(300);
        worker.fetch();

        assert_eq!(
            worker.recv_timeout(WAIT),
            Some(Reply::Recorded { score: 300, ok: true })
        );
        match worker.recv_timeout(WAIT) {
            Some(Reply::Scores(scores)) => {
                assert_eq!(scores.len(), 1);
                assert_eq!(scores[0].username, "Pia");
                assert_eq!(scores[0].score, 300);
                assert_eq!(scores[0].games_played, 1);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_failures_are_reported_not_raised() {
        let store = Arc::new(MemoryStore::new());
        store.set_available(false);
        let worker =
            LeaderboardWorker::spawn(LeaderboardClient::new(store.clone()), player()).unwrap();

        worker.record(10);
        worker.fetch();
        assert_eq!(
            worker.recv_timeout(WAIT),
            Some(Reply::Recorded { score: 10, ok: false })
        );
        assert!(matches!(
            worker.recv_timeout(WAIT),
            Some(Reply::FetchFailed(_))
        ));
    }

    #[test]
    fn test_drop_flushes_pending_writes() {
        let store = Arc::new(MemoryStore::new());
        {
            let worker =
                LeaderboardWorker::spawn(LeaderboardClient::new(store.clone()), player())
                    .unwrap();
            worker.record(50);
            worker.record(80);
        }
        let record = store.record("p1").unwrap();
        assert_eq!(record.score, Some(80));
        assert_eq!(record.games_played, Some(2));
    }
}
