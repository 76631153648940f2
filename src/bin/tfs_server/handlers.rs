use super::*;

pub(super) async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub(super) async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(update): Json<Update>,
) -> Response {
    let Some(inbound) = parse_update(&update) else {
        debug!(update_id = update.update_id, "update without a user, ignored");
        return accepted();
    };
    let user_id = inbound.user.id;

    let lock = state.user_locks.acquire(user_id).await;
    let response = {
        let _turn = lock.lock().await;
        run_and_queue(&state, inbound).await
    };
    state.user_locks.release(user_id, lock).await;
    response
}

/// Runs the turn and queues its callback answer and replies, in order.
async fn run_and_queue(state: &Arc<AppState>, inbound: Inbound) -> Response {
    let user_id = inbound.user.id;
    let worker = state.clone();
    let handled = tokio::task::spawn_blocking(move || {
        handle_inbound(&worker.storage, &worker.config, &inbound)
    })
    .await;

    let handled = match handled {
        Ok(Ok(handled)) => handled,
        Ok(Err(err)) => {
            error!(user_id, error = %format!("{:#}", err), "turn failed");
            return internal_error(err);
        }
        Err(err) => return internal_error(anyhow!("turn task: {}", err)),
    };

    let Some(handled) = handled else {
        return accepted();
    };

    if let Some(id) = handled.callback_id
        && let Err(err) = state.courier.send(Job::AnswerCallback(id))
    {
        return internal_error(err);
    }
    for reply in handled.replies {
        if let Err(err) = state.courier.send(Job::Deliver(reply)) {
            return internal_error(err);
        }
    }

    accepted()
}

fn accepted() -> Response {
    Json(serde_json::json!({"ok": true})).into_response()
}
