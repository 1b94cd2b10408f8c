use chrono::NaiveDateTime;
use leptos::ev::SubmitEvent;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::server_fn::codec::Json;
use leptos::server_fn::error::NoCustomError;
use leptos::task::spawn_local;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::{
    components::{Route, Router, Routes},
    hooks::use_navigate,
    path, NavigateOptions,
};
use std::collections::HashMap;

use crate::model::{CutoffStatus, CutoffTime, Pair, Participant, ParticipantId, User};
use crate::scoring::{RankedScore, RevealedPair};

#[cfg(feature = "ssr")]
use crate::cache::Cache;
#[cfg(feature = "ssr")]
use crate::config::Config;
#[cfg(feature = "ssr")]
use crate::error::GiftError;
#[cfg(feature = "ssr")]
use crate::{
    admin_login, authenticate, get_all_participants, get_cached_user_predictions,
    get_cutoff_status, get_leaderboard, get_login_codes, get_result_reveal, get_results,
    get_user_by_token, login_user, logout_admin, logout_user, register_user, save_predictions,
    save_results, set_cutoff_time, validate_admin_token, DbPool,
};
#[cfg(feature = "ssr")]
use diesel::SqliteConnection;
#[cfg(feature = "ssr")]
use std::sync::Arc;
#[cfg(feature = "ssr")]
use std::time::Instant;
#[cfg(feature = "ssr")]
use tracing::{error, info, warn};

#[cfg(feature = "ssr")]
const SESSION_COOKIE: &str = "session_token";
#[cfg(feature = "ssr")]
const ADMIN_COOKIE: &str = "admin_token";

/// Shared server state, provided to every server function as context.
#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub cache: Arc<dyn Cache>,
    pub config: Config,
}

#[cfg(feature = "ssr")]
impl AppState {
    fn cache(&self) -> Option<&dyn Cache> {
        Some(self.cache.as_ref())
    }
}

#[cfg(feature = "ssr")]
fn server_error(e: impl std::fmt::Display) -> ServerFnError<NoCustomError> {
    ServerFnError::ServerError(e.to_string())
}

#[cfg(feature = "ssr")]
fn now_utc() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Runs `f` on a blocking thread with a pooled connection. `f` also gets the deadline for this
/// call, which writes check before committing. Waiting for a connection or a lock is bounded by
/// the pool and SQLite timeouts.
#[cfg(feature = "ssr")]
async fn with_conn<T, F>(f: F) -> Result<T, ServerFnError<NoCustomError>>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection, &AppState, Instant) -> Result<T, GiftError> + Send + 'static,
{
    let state: AppState = expect_context();
    let deadline = Instant::now() + state.config.storage_timeout;

    let result = tokio::task::spawn_blocking(move || -> Result<T, GiftError> {
        let mut conn = state.pool.get()?;
        f(&mut *conn, &state, deadline)
    })
    .await
    .map_err(server_error)?;

    result.map_err(|e| {
        if let GiftError::PersistenceFailure(reason) = &e {
            error!("Persistence failure: {reason}");
        }
        server_error(e)
    })
}

#[cfg(feature = "ssr")]
async fn read_cookie(name: &str) -> Result<Option<String>, ServerFnError<NoCustomError>> {
    use axum::http::HeaderMap;
    use leptos_axum::extract;

    let headers: HeaderMap = extract().await.map_err(server_error)?;

    let prefix = format!("{name}=");
    Ok(headers
        .get(axum::http::header::COOKIE)
        .and_then(|header| header.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|cookie| cookie.trim().strip_prefix(prefix.as_str()))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        }))
}

#[cfg(feature = "ssr")]
fn set_cookie(name: &str, value: &str, max_age: u32) -> Result<(), ServerFnError<NoCustomError>> {
    use leptos_axum::ResponseOptions;

    let resp: ResponseOptions = expect_context();
    let cookie = format!("{name}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Strict");
    resp.insert_header(
        axum::http::header::SET_COOKIE,
        axum::http::HeaderValue::from_str(&cookie).map_err(server_error)?,
    );
    Ok(())
}

#[cfg(feature = "ssr")]
async fn require_user() -> Result<User, ServerFnError<NoCustomError>> {
    let token = read_cookie(SESSION_COOKIE).await?;
    with_conn(move |conn, _, _| authenticate(conn, token.as_deref())).await
}

/// Whether the request carries a valid administrator session.
#[cfg(feature = "ssr")]
async fn has_admin_session() -> Result<bool, ServerFnError<NoCustomError>> {
    let Some(token) = read_cookie(ADMIN_COOKIE).await? else {
        return Ok(false);
    };
    with_conn(move |conn, _, _| validate_admin_token(conn, &token)).await
}

#[cfg(feature = "ssr")]
async fn require_admin() -> Result<(), ServerFnError<NoCustomError>> {
    if !has_admin_session().await? {
        warn!("Rejected administrator action");
        return Err(server_error(GiftError::Unauthorized));
    }
    Ok(())
}

/// The roster, for logged-in users and the administrator.
#[server(GetParticipants)]
pub async fn get_participants() -> Result<Vec<Participant>, ServerFnError<NoCustomError>> {
    if !has_admin_session().await? {
        require_user().await?;
    }
    with_conn(|conn, _, _| get_all_participants(conn)).await
}

#[server(GetCurrentUser)]
pub async fn get_current_user() -> Result<Option<User>, ServerFnError<NoCustomError>> {
    let Some(token) = read_cookie(SESSION_COOKIE).await? else {
        return Ok(None);
    };
    with_conn(move |conn, _, _| get_user_by_token(conn, &token)).await
}

#[server(Login)]
pub async fn login(name: String, code: String) -> Result<User, ServerFnError<NoCustomError>> {
    let (user, token) = with_conn(move |conn, _, _| login_user(conn, &name, &code)).await?;
    set_cookie(SESSION_COOKIE, &token, 86400)?;
    info!("User {} logged in", user.id);
    Ok(user)
}

#[server(Logout)]
pub async fn logout() -> Result<(), ServerFnError<NoCustomError>> {
    if let Some(token) = read_cookie(SESSION_COOKIE).await? {
        with_conn(move |conn, _, _| logout_user(conn, &token)).await?;
    }
    set_cookie(SESSION_COOKIE, "", 0)
}

#[server(IsAdmin)]
pub async fn is_admin() -> Result<bool, ServerFnError<NoCustomError>> {
    has_admin_session().await
}

#[server(AdminLogin)]
pub async fn admin_login_handler(password: String) -> Result<(), ServerFnError<NoCustomError>> {
    let token = with_conn(move |conn, state, _| {
        admin_login(conn, &password, state.config.admin_password.as_deref())
    })
    .await?;
    set_cookie(ADMIN_COOKIE, &token, 86400)?;
    info!("Administrator logged in");
    Ok(())
}

#[server(AdminLogout)]
pub async fn admin_logout() -> Result<(), ServerFnError<NoCustomError>> {
    if let Some(token) = read_cookie(ADMIN_COOKIE).await? {
        with_conn(move |conn, _, _| logout_admin(conn, &token)).await?;
    }
    set_cookie(ADMIN_COOKIE, "", 0)
}

/// Registers a user and returns their login code.
#[server(RegisterUser)]
pub async fn register_user_handler(name: String) -> Result<String, ServerFnError<NoCustomError>> {
    require_admin().await?;
    let (_, code) = with_conn(move |conn, _, _| register_user(conn, &name)).await?;
    Ok(code)
}

/// `(name, login code)` for every registered user.
#[server(GetLoginCodes)]
pub async fn get_login_codes_handler(
) -> Result<Vec<(String, String)>, ServerFnError<NoCustomError>> {
    require_admin().await?;
    with_conn(|conn, _, _| get_login_codes(conn)).await
}

#[server(GetCutoff)]
pub async fn get_cutoff() -> Result<CutoffStatus, ServerFnError<NoCustomError>> {
    with_conn(|conn, _, _| get_cutoff_status(conn, now_utc())).await
}

#[server(GetMyPredictions)]
pub async fn get_my_predictions() -> Result<Vec<Pair>, ServerFnError<NoCustomError>> {
    let user = require_user().await?;
    with_conn(move |conn, state, _| {
        get_cached_user_predictions(conn, state.cache(), user.id, state.config.predictions_ttl)
    })
    .await
}

/// Replaces the current user's predictions. Returns the number of edges stored.
#[server(name = SaveMyPredictions, input = Json)]
pub async fn save_my_predictions(pairs: Vec<Pair>) -> Result<usize, ServerFnError<NoCustomError>> {
    let user = require_user().await?;
    let validated = with_conn(move |conn, state, deadline| {
        save_predictions(
            conn,
            state.cache(),
            user.id,
            &pairs,
            now_utc(),
            state.config.forbid_self_pairs,
            Some(deadline),
        )
    })
    .await?;
    Ok(validated.len())
}

#[server(GetLeaderboard)]
pub async fn get_leaderboard_handler() -> Result<Vec<RankedScore>, ServerFnError<NoCustomError>> {
    require_user().await?;
    with_conn(|conn, state, _| {
        get_leaderboard(conn, state.cache(), state.config.leaderboard_ttl)
    })
    .await
}

/// Who predicted each result edge. Empty while submissions are still open.
#[server(GetReveal)]
pub async fn get_reveal() -> Result<Vec<RevealedPair>, ServerFnError<NoCustomError>> {
    require_user().await?;
    with_conn(|conn, _, _| {
        if get_cutoff_status(conn, now_utc())?.is_open {
            return Ok(Vec::new());
        }
        get_result_reveal(conn)
    })
    .await
}

#[server(GetResults)]
pub async fn get_results_handler() -> Result<Vec<Pair>, ServerFnError<NoCustomError>> {
    require_admin().await?;
    with_conn(|conn, _, _| get_results(conn)).await
}

#[server(name = SaveResults, input = Json)]
pub async fn save_results_handler(pairs: Vec<Pair>) -> Result<usize, ServerFnError<NoCustomError>> {
    require_admin().await?;
    let validated = with_conn(move |conn, state, deadline| {
        save_results(
            conn,
            state.cache(),
            &pairs,
            state.config.forbid_self_pairs,
            Some(deadline),
        )
    })
    .await?;
    info!("Results replaced by the administrator");
    Ok(validated.len())
}

#[server(SetCutoff)]
pub async fn set_cutoff_handler(
    datetime: NaiveDateTime,
) -> Result<CutoffTime, ServerFnError<NoCustomError>> {
    require_admin().await?;
    with_conn(move |conn, _, _| set_cutoff_time(conn, datetime)).await
}

/// Turns the gifter -> giftee selection of a form into pairs ordered by gifter.
fn selection_to_pairs(selection: &HashMap<ParticipantId, ParticipantId>) -> Vec<Pair> {
    let mut pairs: Vec<Pair> = selection
        .iter()
        .map(|(&gifter_id, &giftee_id)| Pair::new(gifter_id, giftee_id))
        .collect();
    pairs.sort();
    pairs
}

fn pairs_to_selection(pairs: &[Pair]) -> HashMap<ParticipantId, ParticipantId> {
    pairs.iter().map(|p| (p.gifter_id, p.giftee_id)).collect()
}

/// Parses the value of a `datetime-local` input, with or without seconds.
fn parse_cutoff_input(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/secret-santa.css" />

        <Title text="Secret Santa" />

        <Router>
            <main>
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/login") view=LoginPage />
                    <Route path=path!("/predictions") view=PredictionsPage />
                    <Route path=path!("/winners") view=LeaderboardPage />
                    <Route path=path!("/admin") view=AdminPage />
                    <Route path=path!("/admin/login") view=AdminLoginPage />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn CutoffBanner(status: CutoffStatus) -> impl IntoView {
    match (status.cutoff, status.is_open) {
        (None, _) => view! { <p>"Predictions are open."</p> }.into_any(),
        (Some(cutoff), true) => {
            view! { <p>"Predictions close at " {cutoff.to_string()} " UTC."</p> }.into_any()
        }
        (Some(cutoff), false) => {
            view! { <p class="closed">"Predictions closed at " {cutoff.to_string()} " UTC."</p> }
                .into_any()
        }
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let current_user = Resource::new(|| (), |_| get_current_user());
    let cutoff = Resource::new(|| (), |_| get_cutoff());
    let admin = Resource::new(|| (), |_| is_admin());

    let do_logout = move |_| {
        spawn_local(async move {
            match logout().await {
                Ok(_) => current_user.refetch(),
                Err(e) => log!("Error logging out: {}", e),
            }
        });
    };

    view! {
        <div>
            <h1>"Secret Santa"</h1>
            <Suspense fallback=|| view! { "Loading..." }>
                {move || {
                    cutoff
                        .with(|res| match res {
                            Some(Ok(status)) => view! { <CutoffBanner status=status.clone() /> }.into_any(),
                            _ => view! {}.into_any(),
                        })
                }}
            </Suspense>
            <Suspense fallback=|| view! { "Checking login..." }>
                {move || {
                    current_user
                        .with(|res| match res {
                            Some(Ok(Some(user))) => {
                                view! {
                                    <h2>"Welcome, " {user.name.clone()}</h2>
                                    <ul>
                                        <li>
                                            <a href="/predictions">"My predictions"</a>
                                        </li>
                                        <li>
                                            <a href="/winners">"Leaderboard"</a>
                                        </li>
                                    </ul>
                                    <button on:click=do_logout>"Log out"</button>
                                }
                                    .into_any()
                            }
                            _ => {
                                view! {
                                    <p>
                                        <a href="/login">"Login"</a>
                                    </p>
                                }
                                    .into_any()
                            }
                        })
                }}
            </Suspense>
            <Suspense>
                {move || {
                    admin
                        .with(|res| match res {
                            Some(Ok(true)) => view! { <a href="/admin">"Admin"</a> }.into_any(),
                            _ => view! { <a href="/admin/login">"Admin login"</a> }.into_any(),
                        })
                }}
            </Suspense>
        </div>
    }
}

#[component]
fn LoginPage() -> impl IntoView {
    let name = RwSignal::new(String::new());
    let code = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let n = name.get();
        let c = code.get();
        if n.trim().is_empty() || c.trim().is_empty() {
            error.set("Please enter your name and login code.".to_string());
            return;
        }
        spawn_local(async move {
            match login(n, c).await {
                Ok(_) => {
                    error.set(String::new());
                    let navigate = use_navigate();
                    navigate("/", NavigateOptions::default());
                }
                Err(e) => error.set(e.to_string()),
            }
        });
    };

    view! {
        <div>
            <h1>"Login"</h1>
            <form on:submit=submit>
                <label>
                    "Name: " <input type="text" on:input=move |ev| name.set(event_target_value(&ev)) />
                </label>
                <label>
                    "Login code: "
                    <input type="password" on:input=move |ev| code.set(event_target_value(&ev)) />
                </label>
                <button type="submit">"Login"</button>
            </form>
            {move || (!error.get().is_empty()).then(|| view! { <p class="error">{error.get()}</p> })}
        </div>
    }
}

#[component]
fn AdminLoginPage() -> impl IntoView {
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let p = password.get();
        if p.is_empty() {
            error.set("Please enter the password.".to_string());
            return;
        }
        spawn_local(async move {
            match admin_login_handler(p).await {
                Ok(_) => {
                    error.set(String::new());
                    let navigate = use_navigate();
                    navigate("/admin", NavigateOptions::default());
                }
                Err(e) => error.set(e.to_string()),
            }
        });
    };

    view! {
        <div>
            <h1>"Admin login"</h1>
            <form on:submit=submit>
                <label>
                    "Password: "
                    <input type="password" on:input=move |ev| password.set(event_target_value(&ev)) />
                </label>
                <button type="submit">"Login"</button>
            </form>
            {move || (!error.get().is_empty()).then(|| view! { <p class="error">{error.get()}</p> })}
        </div>
    }
}

/// One row per participant as gifter, each with a giftee dropdown. Choosing "-" clears the row.
#[component]
fn PairSelector(
    participants: Vec<Participant>,
    selection: RwSignal<HashMap<ParticipantId, ParticipantId>>,
    #[prop(into)] disabled: Signal<bool>,
) -> impl IntoView {
    let options = participants.clone();

    view! {
        <table>
            <tr>
                <th>"Gifter"</th>
                <th>"Giftee"</th>
            </tr>
            {participants
                .into_iter()
                .map(|gifter| {
                    let gifter_id = gifter.id;
                    let options = options.clone();
                    view! {
                        <tr>
                            <td>
                                <img src=gifter.avatar_url.clone() alt="" width="32" />
                                {gifter.name.clone()}
                            </td>
                            <td>
                                <select
                                    disabled=move || disabled.get()
                                    on:change=move |ev| {
                                        let giftee_id = event_target_value(&ev)
                                            .parse::<i32>()
                                            .unwrap_or(0);
                                        selection
                                            .update(|s| {
                                                if giftee_id == 0 {
                                                    s.remove(&gifter_id);
                                                } else {
                                                    s.insert(gifter_id, giftee_id);
                                                }
                                            });
                                    }
                                >
                                    <option value="0">"-"</option>
                                    {options
                                        .into_iter()
                                        .map(|giftee| {
                                            let giftee_id = giftee.id;
                                            view! {
                                                <option
                                                    value=giftee_id.to_string()
                                                    selected=move || {
                                                        selection
                                                            .with(|s| s.get(&gifter_id) == Some(&giftee_id))
                                                    }
                                                >
                                                    {giftee.name}
                                                </option>
                                            }
                                        })
                                        .collect_view()}
                                </select>
                            </td>
                        </tr>
                    }
                })
                .collect_view()}
        </table>
    }
}

#[component]
fn PredictionsPage() -> impl IntoView {
    let participants = Resource::new(|| (), |_| get_participants());
    let cutoff = Resource::new(|| (), |_| get_cutoff());
    let my_predictions = Resource::new(|| (), |_| get_my_predictions());

    let selection = RwSignal::new(HashMap::new());
    let message = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());

    // Prefill the form with the stored predictions once they arrive.
    Effect::new(move || {
        if let Some(Ok(pairs)) = my_predictions.get() {
            selection.set(pairs_to_selection(&pairs));
        }
    });

    let closed = Signal::derive(move || {
        cutoff.with(|res| matches!(res, Some(Ok(status)) if !status.is_open))
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let pairs = selection.with(selection_to_pairs);
        spawn_local(async move {
            match save_my_predictions(pairs).await {
                Ok(count) => {
                    error.set(String::new());
                    message.set(format!("Saved {count} predictions."));
                    my_predictions.refetch();
                }
                Err(e) => {
                    message.set(String::new());
                    error.set(e.to_string());
                }
            }
        });
    };

    view! {
        <div>
            <h1>"My predictions"</h1>
            <p>"Guess who is giving a gift to whom. Saving replaces your previous guesses."</p>
            <Suspense fallback=|| view! { "Loading..." }>
                {move || {
                    cutoff
                        .with(|res| match res {
                            Some(Ok(status)) => view! { <CutoffBanner status=status.clone() /> }.into_any(),
                            _ => view! {}.into_any(),
                        })
                }}
                {move || {
                    participants
                        .with(|res| match res {
                            Some(Ok(participants)) => {
                                view! {
                                    <form on:submit=submit>
                                        <PairSelector
                                            participants=participants.clone()
                                            selection=selection
                                            disabled=closed
                                        />
                                        <button type="submit" disabled=move || closed.get()>
                                            "Save"
                                        </button>
                                    </form>
                                }
                                    .into_any()
                            }
                            Some(Err(e)) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                            None => view! { "Loading..." }.into_any(),
                        })
                }}
            </Suspense>
            {move || (!message.get().is_empty()).then(|| view! { <p>{message.get()}</p> })}
            {move || (!error.get().is_empty()).then(|| view! { <p class="error">{error.get()}</p> })}
            <p>
                <a href="/">"Back"</a>
            </p>
        </div>
    }
}

#[component]
fn LeaderboardPage() -> impl IntoView {
    let leaderboard = Resource::new(|| (), |_| get_leaderboard_handler());
    let reveal = Resource::new(|| (), |_| get_reveal());
    let participants = Resource::new(|| (), |_| get_participants());

    let participant_name = move |id: ParticipantId| {
        participants.with(|res| match res {
            Some(Ok(list)) => list
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("#{id}")),
            _ => format!("#{id}"),
        })
    };

    view! {
        <div>
            <h1>"Leaderboard"</h1>
            <Suspense fallback=|| view! { "Loading..." }>
                {move || {
                    leaderboard
                        .with(|res| match res {
                            Some(Ok(scores)) => {
                                view! {
                                    <table class="leaderboard">
                                        <tr>
                                            <th>"#"</th>
                                            <th>"Name"</th>
                                            <th>"Correct"</th>
                                            <th>"Accuracy"</th>
                                        </tr>
                                        {scores
                                            .iter()
                                            .map(|score| {
                                                view! {
                                                    <tr>
                                                        <td>{score.rank}</td>
                                                        <td>
                                                            {score
                                                                .user_name
                                                                .clone()
                                                                .unwrap_or_else(|| format!("User {}", score.user_id))}
                                                        </td>
                                                        <td>
                                                            {format!("{}/{}", score.correct_guesses, score.total_guesses)}
                                                        </td>
                                                        <td>{format!("{:.1}%", score.accuracy_percent())}</td>
                                                    </tr>
                                                }
                                            })
                                            .collect_view()}
                                    </table>
                                }
                                    .into_any()
                            }
                            Some(Err(e)) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                            None => view! { "Loading..." }.into_any(),
                        })
                }}
            </Suspense>
            <Suspense>
                {move || {
                    reveal
                        .with(|res| match res {
                            Some(Ok(pairs)) if !pairs.is_empty() => {
                                view! {
                                    <h2>"Who gave to whom"</h2>
                                    <ul>
                                        {pairs
                                            .iter()
                                            .map(|revealed| {
                                                let guessed_by = if revealed.predicted_by.is_empty() {
                                                    "nobody".to_string()
                                                } else {
                                                    revealed.predicted_by.join(", ")
                                                };
                                                view! {
                                                    <li>
                                                        {participant_name(revealed.pair.gifter_id)} " -> "
                                                        {participant_name(revealed.pair.giftee_id)}
                                                        " (guessed by " {guessed_by} ")"
                                                    </li>
                                                }
                                            })
                                            .collect_view()}
                                    </ul>
                                }
                                    .into_any()
                            }
                            _ => view! {}.into_any(),
                        })
                }}
            </Suspense>
            <p>
                <a href="/">"Back"</a>
            </p>
        </div>
    }
}

#[component]
fn AdminPage() -> impl IntoView {
    let admin = Resource::new(|| (), |_| is_admin());
    let participants = Resource::new(|| (), |_| get_participants());
    let results = Resource::new(|| (), |_| get_results_handler());
    let cutoff = Resource::new(|| (), |_| get_cutoff());
    let login_codes = Resource::new(|| (), |_| get_login_codes_handler());

    // Redirects to the admin login without an administrator session.
    let navigate = use_navigate();
    Effect::new(move || {
        if let Some(Ok(false)) = admin.get() {
            navigate("/admin/login", NavigateOptions::default());
        }
    });

    let new_user = RwSignal::new(String::new());
    let user_message = RwSignal::new(String::new());
    let user_error = RwSignal::new(String::new());

    let user_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let name = new_user.get();
        if name.trim().is_empty() {
            user_error.set("Please enter a name.".to_string());
            return;
        }
        spawn_local(async move {
            match register_user_handler(name.clone()).await {
                Ok(code) => {
                    user_error.set(String::new());
                    user_message.set(format!("{} can log in with code {code}", name.trim()));
                    login_codes.refetch();
                }
                Err(e) => {
                    user_message.set(String::new());
                    user_error.set(e.to_string());
                }
            }
        });
    };

    let do_logout = move |_| {
        spawn_local(async move {
            match admin_logout().await {
                Ok(_) => admin.refetch(),
                Err(e) => log!("Error logging out: {}", e),
            }
        });
    };

    let selection = RwSignal::new(HashMap::new());
    let results_message = RwSignal::new(String::new());
    let results_error = RwSignal::new(String::new());

    Effect::new(move || {
        if let Some(Ok(pairs)) = results.get() {
            selection.set(pairs_to_selection(&pairs));
        }
    });

    let results_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let pairs = selection.with(selection_to_pairs);
        spawn_local(async move {
            match save_results_handler(pairs).await {
                Ok(count) => {
                    results_error.set(String::new());
                    results_message.set(format!("Saved {count} results."));
                    results.refetch();
                }
                Err(e) => {
                    results_message.set(String::new());
                    results_error.set(e.to_string());
                }
            }
        });
    };

    let cutoff_input = RwSignal::new(String::new());
    let cutoff_error = RwSignal::new(String::new());

    let cutoff_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let Some(datetime) = parse_cutoff_input(&cutoff_input.get()) else {
            cutoff_error.set("Please enter a valid date and time.".to_string());
            return;
        };
        spawn_local(async move {
            match set_cutoff_handler(datetime).await {
                Ok(saved) => {
                    log!("Cutoff set to {}", saved.datetime);
                    cutoff_error.set(String::new());
                    cutoff.refetch();
                }
                Err(e) => cutoff_error.set(e.to_string()),
            }
        });
    };

    view! {
        <div>
            <h1>"Admin"</h1>
            <h2>"Cutoff"</h2>
            <Suspense fallback=|| view! { "Loading..." }>
                {move || {
                    cutoff
                        .with(|res| match res {
                            Some(Ok(status)) => view! { <CutoffBanner status=status.clone() /> }.into_any(),
                            _ => view! {}.into_any(),
                        })
                }}
            </Suspense>
            <form on:submit=cutoff_submit>
                <label>
                    "New cutoff (UTC): "
                    <input
                        type="datetime-local"
                        on:input=move |ev| cutoff_input.set(event_target_value(&ev))
                    />
                </label>
                <button type="submit">"Set cutoff"</button>
            </form>
            {move || {
                (!cutoff_error.get().is_empty())
                    .then(|| view! { <p class="error">{cutoff_error.get()}</p> })
            }}

            <h2>"Results"</h2>
            <p>"Every participant must give and receive exactly one gift."</p>
            <Suspense fallback=|| view! { "Loading..." }>
                {move || {
                    participants
                        .with(|res| match res {
                            Some(Ok(participants)) => {
                                view! {
                                    <form on:submit=results_submit>
                                        <PairSelector
                                            participants=participants.clone()
                                            selection=selection
                                            disabled=false
                                        />
                                        <button type="submit">"Save results"</button>
                                    </form>
                                }
                                    .into_any()
                            }
                            Some(Err(e)) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                            None => view! { "Loading..." }.into_any(),
                        })
                }}
            </Suspense>
            {move || {
                (!results_message.get().is_empty()).then(|| view! { <p>{results_message.get()}</p> })
            }}
            {move || {
                (!results_error.get().is_empty())
                    .then(|| view! { <p class="error">{results_error.get()}</p> })
            }}

            <h2>"Users"</h2>
            <form on:submit=user_submit>
                <label>
                    "Name: "
                    <input type="text" on:input=move |ev| new_user.set(event_target_value(&ev)) />
                </label>
                <button type="submit">"Register"</button>
            </form>
            {move || (!user_message.get().is_empty()).then(|| view! { <p>{user_message.get()}</p> })}
            {move || {
                (!user_error.get().is_empty()).then(|| view! { <p class="error">{user_error.get()}</p> })
            }}
            <Suspense fallback=|| view! { "Loading..." }>
                {move || {
                    login_codes
                        .with(|res| match res {
                            Some(Ok(codes)) => {
                                view! {
                                    <table>
                                        <tr>
                                            <th>"Name"</th>
                                            <th>"Login code"</th>
                                        </tr>
                                        {codes
                                            .iter()
                                            .map(|(name, code)| {
                                                view! {
                                                    <tr>
                                                        <td>{name.clone()}</td>
                                                        <td>
                                                            <code>{code.clone()}</code>
                                                        </td>
                                                    </tr>
                                                }
                                            })
                                            .collect_view()}
                                    </table>
                                }
                                    .into_any()
                            }
                            _ => view! {}.into_any(),
                        })
                }}
            </Suspense>
            <p>
                <button on:click=do_logout>"Log out"</button>
                <a href="/">"Back"</a>
            </p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_to_pairs_sorted_by_gifter() {
        let selection = HashMap::from([(3, 1), (1, 2), (2, 3)]);
        assert_eq!(
            selection_to_pairs(&selection),
            vec![Pair::new(1, 2), Pair::new(2, 3), Pair::new(3, 1)]
        );
        assert!(selection_to_pairs(&HashMap::new()).is_empty());
    }

    #[test]
    fn test_pairs_to_selection() {
        let selection = pairs_to_selection(&[Pair::new(1, 2), Pair::new(2, 1)]);
        assert_eq!(selection.get(&1), Some(&2));
        assert_eq!(selection.get(&2), Some(&1));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_parse_cutoff_input() {
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 12, 24)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        assert_eq!(parse_cutoff_input("2024-12-24T20:00"), Some(expected));
        assert_eq!(parse_cutoff_input(" 2024-12-24T20:00:00 "), Some(expected));
        assert_eq!(parse_cutoff_input(""), None);
        assert_eq!(parse_cutoff_input("24/12/2024 20:00"), None);
    }
}
