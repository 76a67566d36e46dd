use rand::Rng;

use crate::agent::Agent;
use crate::engine::{Action, Board};
use crate::ntuple::NTupleError;

/// One decision step: the pre-action state, the chosen action, and what
/// followed. The optional fields are all `None` exactly when this step ended
/// the game (the move was illegal, or no tile could be spawned afterwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: Board,
    pub action: Action,
    pub reward: Option<u32>,
    /// Board right after the move's merges, before the spawn.
    pub after: Option<Board>,
    /// Board after the spawned tile.
    pub next: Option<Board>,
}

/// A full episode: every transition in order, plus aggregate outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct Gameplay {
    pub transitions: Vec<Transition>,
    pub total_reward: u64,
    pub max_tile: u32,
}

/// Play `start` (or a freshly seeded board) to the end with the agent's
/// greedy policy, recording every transition.
///
/// Each step asks for the best action, applies it, then spawns a tile. The
/// episode ends when the chosen move is illegal or the spawn finds no empty
/// cell; that final step is recorded as a terminal transition. A last move
/// whose spawn fails still counts toward the total reward.
pub fn play<R: Rng + ?Sized>(
    agent: &Agent,
    start: Option<Board>,
    random_tile: bool,
    rng: &mut R,
) -> Result<Gameplay, NTupleError> {
    let mut board = match start {
        Some(board) => board,
        None => Board::new_game(rng),
    };
    let mut transitions = Vec::new();
    let mut total_reward = 0u64;
    loop {
        let action = agent.best_action(&board)?;
        let state = board;
        let mut next = board;
        let terminal = match next.act(action) {
            Ok(reward) => {
                total_reward += reward as u64;
                let after = next;
                match next.spawn_tile(random_tile, rng) {
                    Ok(()) => {
                        transitions.push(Transition {
                            state,
                            action,
                            reward: Some(reward),
                            after: Some(after),
                            next: Some(next),
                        });
                        board = next;
                        false
                    }
                    Err(_) => {
                        board = after;
                        true
                    }
                }
            }
            Err(_) => true,
        };
        if terminal {
            transitions.push(Transition {
                state,
                action,
                reward: None,
                after: None,
                next: None,
            });
            break;
        }
    }
    Ok(Gameplay {
        transitions,
        total_reward,
        max_tile: board.highest_tile(),
    })
}

/// Run the TD(0) update over a finished episode: transitions in reverse
/// chronological order, skipping the terminal one.
pub fn learn_from_gameplay(
    agent: &mut Agent,
    gameplay: &Gameplay,
    alpha: f64,
) -> Result<(), NTupleError> {
    for tr in gameplay.transitions.iter().rev().skip(1) {
        if let (Some(reward), Some(after), Some(next)) = (tr.reward, tr.after, tr.next) {
            agent.learn(tr.state, tr.action, reward, after, next, alpha)?;
        }
    }
    Ok(())
}
