use td_2048::agent::Agent;
use td_2048::engine::Board;

fn main() -> anyhow::Result<()> {
    let agent = Agent::default();
    let mut rng = rand::thread_rng();
    let mut board = Board::new_game(&mut rng);
    println!("{}", board);
    let mut move_count = 0;
    let mut total_reward = 0u64;
    loop {
        let action = agent.best_action(&board)?;
        match board.act(action) {
            Ok(reward) => {
                move_count += 1;
                total_reward += reward as u64;
            }
            Err(_) => break,
        }
        if board.spawn_tile(true, &mut rng).is_err() {
            break;
        }
        println!("{}", board);
    }
    println!(
        "Moves made: {}, total reward: {}, highest tile: {}",
        move_count,
        total_reward,
        board.highest_tile()
    );
    Ok(())
}
