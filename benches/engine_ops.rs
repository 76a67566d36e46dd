use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

use td_2048::agent::Agent;
use td_2048::engine::{Action, Board};
use td_2048::gameplay::play;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = Vec::new();
    let mut board = Board::new_game(&mut rng);
    boards.push(board);
    // Derive a variety of densities deterministically
    let seq = [Action::Left, Action::Up, Action::Right, Action::Down];
    for i in 0..40 {
        let mut moved = board;
        if moved.act(seq[i % seq.len()]).is_ok() {
            let _ = moved.spawn_tile(true, &mut rng);
            board = moved;
        }
        boards.push(board);
    }
    boards
}

fn bench_act(c: &mut Criterion) {
    for (name, action) in [
        ("act/left", Action::Left),
        ("act/right", Action::Right),
        ("act/up", Action::Up),
        ("act/down", Action::Down),
    ] {
        c.bench_function(name, |bch| {
            let boards = corpus();
            bch.iter(|| {
                let mut acc = 0u64;
                for &bd in &boards {
                    let mut moved = bd;
                    if let Ok(reward) = moved.act(action) {
                        acc = acc.wrapping_add(reward as u64);
                    }
                }
                black_box(acc)
            })
        });
    }
}

fn bench_value(c: &mut Criterion) {
    c.bench_function("network/value", |bch| {
        let agent = Agent::default();
        let boards = corpus();
        bch.iter(|| {
            let mut acc = 0.0;
            for bd in &boards {
                acc += agent.network().value(bd).unwrap();
            }
            black_box(acc)
        })
    });
}

fn bench_episode(c: &mut Criterion) {
    c.bench_function("gameplay/play_greedy", |bch| {
        let agent = Agent::default();
        bch.iter_batched(
            || StdRng::seed_from_u64(7),
            |mut rng| black_box(play(&agent, None, true, &mut rng).unwrap().total_reward),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(engine_ops, bench_act, bench_value, bench_episode);
criterion_main!(engine_ops);
