use dropgrid::prelude::*;
use rand::Rng;

// ---------------------------------------------------------------------------
// Match setup
// ---------------------------------------------------------------------------

/// Hand authority to a fresh participant after this many moves.
const HANDOVER_AFTER: u32 = 12;

#[tokio::main]
async fn main() -> Result<(), DropgridError> {
    dropgrid::logging::init_with_default("dropgrid=info,local_match=info");

    let config = MatchConfig::default();
    let cooldown = config.authority.move_cooldown;
    let session = LocalSession::new(config)?;

    let mut seats = vec![
        session.join(PlayerId(1)).await?,
        session.join(PlayerId(2)).await?,
    ];
    sync(&session, &mut seats).await?;

    let mut rng = rand::rng();
    let mut handed_over = false;

    loop {
        let Some(mover) = seats.iter().position(|p| p.status() == ClientStatus::YourTurn) else {
            break;
        };
        let board = seats[mover].client().mirror().board().clone();
        let open: Vec<usize> = (0..board.columns())
            .filter(|&c| board.find_drop_row(c).is_some())
            .collect();
        let column = open[rng.random_range(0..open.len())];

        tracing::info!(player_id = %seats[mover].id(), column, "playing");
        seats[mover].submit_move(column).await?;
        sync(&session, &mut seats).await?;
        // Requests inside the cooldown are throttled.
        tokio::time::sleep(cooldown).await;

        let moves = seats[0].client().mirror().move_number();
        if !handed_over && moves >= HANDOVER_AFTER {
            handed_over = true;
            let holder = seats.remove(0);
            tracing::info!(player_id = %holder.id(), moves, "authority holder leaving");
            holder.leave().await?;
            seats.push(session.join(PlayerId(3)).await?);
            sync(&session, &mut seats).await?;
        }
    }

    let first = &seats[0];
    println!("{}", first.client().mirror().board());
    println!("{}", first.status());
    if let Some(info) = session.settle().await? {
        println!("{} moves, holder {}", info.move_number, info.holder);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn sync(session: &LocalSession, seats: &mut [Participant]) -> Result<(), DropgridError> {
    session.settle().await?;
    for seat in seats.iter_mut() {
        seat.pump().await?;
    }
    Ok(())
}
