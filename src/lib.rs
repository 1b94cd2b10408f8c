pub mod app;
pub mod cache;
#[cfg(feature = "ssr")]
pub mod config;
pub mod error;
pub mod model;
pub mod pairing;
#[cfg(feature = "ssr")]
pub mod schema;
pub mod scoring;

#[cfg(feature = "ssr")]
use chrono::NaiveDateTime;
#[cfg(feature = "ssr")]
use diesel::connection::SimpleConnection;
#[cfg(feature = "ssr")]
use diesel::dsl::max;
#[cfg(feature = "ssr")]
use diesel::prelude::*;
#[cfg(feature = "ssr")]
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
#[cfg(feature = "ssr")]
use diesel::SqliteConnection;
#[cfg(feature = "ssr")]
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
#[cfg(feature = "ssr")]
use dotenvy::dotenv;
#[cfg(feature = "ssr")]
use serde::{de::DeserializeOwned, Serialize};
#[cfg(feature = "ssr")]
use std::env;
#[cfg(feature = "ssr")]
use std::time::{Duration, Instant};
#[cfg(feature = "ssr")]
use subtle::ConstantTimeEq;
#[cfg(feature = "ssr")]
use tracing::{debug, info, warn};
#[cfg(feature = "ssr")]
use uuid::Uuid;

#[cfg(feature = "ssr")]
use crate::cache::{predictions_cache_key, Cache, LEADERBOARD_CACHE_KEY};
#[cfg(feature = "ssr")]
use crate::config::Config;
#[cfg(feature = "ssr")]
use crate::error::GiftError;
#[cfg(feature = "ssr")]
use crate::model::{
    CutoffStatus, CutoffTime, NewAdminSession, NewCutoffTime, NewParticipant, NewPrediction,
    NewResultEdge, NewSession, NewUser, OwnedPair, Pair, Participant, ParticipantId, Prediction,
    ResultEdge, User, UserId, UserSummary,
};
#[cfg(feature = "ssr")]
use crate::pairing::{check_complete, validate_assignments, ValidatedPairs, ValidationOptions};
#[cfg(feature = "ssr")]
use crate::schema::{
    admin_sessions, cutoff_times, participants, predictions, results, sessions, users,
};
#[cfg(feature = "ssr")]
use crate::scoring::{compute_leaderboard, result_reveal, RankedScore, RevealedPair};

#[cfg(feature = "ssr")]
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[cfg(feature = "ssr")]
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}

/// Enables foreign keys, WAL mode to allow concurrent reads during writes, and a busy timeout to
/// retry locked operations.
#[cfg(feature = "ssr")]
fn configure_connection(conn: &mut SqliteConnection, busy_timeout: Duration) -> QueryResult<()> {
    conn.batch_execute(&format!(
        "PRAGMA foreign_keys = ON; \
        PRAGMA journal_mode = WAL; \
        PRAGMA synchronous = NORMAL; \
        PRAGMA busy_timeout = {};",
        busy_timeout.as_millis()
    ))
}

/// Applies the connection pragmas to every connection the pool hands out.
#[cfg(feature = "ssr")]
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

#[cfg(feature = "ssr")]
impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        configure_connection(conn, self.busy_timeout).map_err(diesel::r2d2::Error::QueryError)
    }
}

#[cfg(feature = "ssr")]
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), GiftError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| GiftError::PersistenceFailure(e.to_string()))?;
    Ok(())
}

/// Opens a single connection for the operator binaries, with migrations applied.
#[cfg(feature = "ssr")]
pub fn establish_connection() -> SqliteConnection {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
    let mut conn = SqliteConnection::establish(&database_url)
        .unwrap_or_else(|_| panic!("Error connecting to {}", database_url));

    configure_connection(&mut conn, Duration::from_millis(10000))
        .expect("Failed to set SQLite PRAGMAs");
    run_migrations(&mut conn).expect("Failed to run migrations");

    conn
}

/// Builds the server's connection pool and brings the schema up to date. Waiting for a pooled
/// connection and waiting on a locked database are both bounded by the storage timeout.
#[cfg(feature = "ssr")]
pub fn build_pool(config: &Config) -> Result<DbPool, GiftError> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .connection_timeout(config.storage_timeout)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: config.storage_timeout,
        }))
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    Ok(pool)
}

/// Identifies the state cached data was built from: the highest row id it read. Ids are never
/// reused, so any replace of the underlying set changes it.
#[cfg(feature = "ssr")]
type Version = Option<i32>;

/// Returns the cached JSON value under `key` if present, otherwise computes it with `load` and
/// caches it for `ttl`. Without a cache this is just `load`.
///
/// `load` also reports the version it read. If `version` differs once the entry is written, a
/// save committed in between and may already have dropped the key, so the entry is dropped again.
#[cfg(feature = "ssr")]
fn cached<T, L, V>(
    conn: &mut SqliteConnection,
    cache: Option<&dyn Cache>,
    key: &str,
    ttl: Duration,
    load: L,
    version: V,
) -> Result<T, GiftError>
where
    T: Serialize + DeserializeOwned,
    L: FnOnce(&mut SqliteConnection) -> Result<(T, Version), GiftError>,
    V: FnOnce(&mut SqliteConnection) -> Result<Version, GiftError>,
{
    let Some(cache) = cache else {
        return load(conn).map(|(value, _)| value);
    };

    if let Some(hit) = cache.get(key) {
        match serde_json::from_str(&hit) {
            Ok(value) => {
                debug!("Cache hit for {key}");
                return Ok(value);
            }
            Err(e) => warn!("Discarding unreadable cache entry {key}: {e}"),
        }
    }

    debug!("Cache miss for {key}");
    let (value, loaded_version) = load(conn)?;
    cache.set(key, serde_json::to_string(&value)?, ttl);
    if version(conn)? != loaded_version {
        debug!("{key} changed while loading, dropping entry");
        cache.del(key);
    }
    Ok(value)
}

/// Fails once `deadline` has passed. Write paths call this as the last step of their transaction,
/// so an overrun rolls the write back instead of committing after the caller gave up.
#[cfg(feature = "ssr")]
fn check_deadline(deadline: Option<Instant>) -> Result<(), GiftError> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => {
            warn!("Storage deadline passed, rolling back");
            Err(GiftError::PersistenceFailure(
                "storage deadline exceeded".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

/// Compares two secrets in time independent of where they differ.
#[cfg(feature = "ssr")]
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

/// Fetches the roster, ordered by name.
#[cfg(feature = "ssr")]
pub fn get_all_participants(conn: &mut SqliteConnection) -> Result<Vec<Participant>, GiftError> {
    Ok(participants::table
        .order(participants::name.asc())
        .select(Participant::as_select())
        .load(conn)?)
}

#[cfg(feature = "ssr")]
fn get_roster_ids(conn: &mut SqliteConnection) -> Result<Vec<ParticipantId>, GiftError> {
    Ok(participants::table.select(participants::id).load(conn)?)
}

#[cfg(feature = "ssr")]
pub fn add_participant(
    conn: &mut SqliteConnection,
    name: &str,
    avatar_url: &str,
) -> Result<Participant, GiftError> {
    Ok(diesel::insert_into(participants::table)
        .values(&NewParticipant { name, avatar_url })
        .returning(Participant::as_returning())
        .get_result(conn)?)
}

/// Inserts a participant per name with the avatar `/images/<lowercase name>.jpg`. Names already on
/// the roster are skipped. Returns the number of participants added.
#[cfg(feature = "ssr")]
pub fn seed_participants(conn: &mut SqliteConnection, names: &[&str]) -> Result<usize, GiftError> {
    conn.transaction::<_, GiftError, _>(|conn| {
        let mut added = 0;
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let avatar_url = format!("/images/{}.jpg", name.to_lowercase());
            added += diesel::insert_or_ignore_into(participants::table)
                .values(&NewParticipant {
                    name,
                    avatar_url: &avatar_url,
                })
                .execute(conn)?;
        }
        Ok(added)
    })
}

/// Registers a user and generates their login code. Returns the user and the code, which is only
/// ever handed out here and by `get_login_codes`.
#[cfg(feature = "ssr")]
pub fn register_user(conn: &mut SqliteConnection, name: &str) -> Result<(User, String), GiftError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GiftError::Unauthorized);
    }

    conn.transaction::<_, GiftError, _>(|conn| {
        let taken: i64 = users::table
            .filter(users::name.eq(name))
            .count()
            .get_result(conn)?;
        if taken > 0 {
            return Err(GiftError::NameTaken(name.to_string()));
        }

        let login_code = Uuid::new_v4().simple().to_string();
        let user = diesel::insert_into(users::table)
            .values(&NewUser {
                name,
                login_code: &login_code,
            })
            .returning(User::as_returning())
            .get_result(conn)?;
        info!("Registered user {name}");
        Ok((user, login_code))
    })
}

/// Lists `(name, login code)` for every user, ordered by name.
#[cfg(feature = "ssr")]
pub fn get_login_codes(conn: &mut SqliteConnection) -> Result<Vec<(String, String)>, GiftError> {
    Ok(users::table
        .order(users::name.asc())
        .select((users::name, users::login_code))
        .load(conn)?)
}

/// Logs a registered user in with their login code and opens a new session. Returns the user and
/// the session token. An unknown name and a wrong code fail the same way.
#[cfg(feature = "ssr")]
pub fn login_user(
    conn: &mut SqliteConnection,
    name: &str,
    login_code: &str,
) -> Result<(User, String), GiftError> {
    let name = name.trim();

    conn.transaction::<_, GiftError, _>(|conn| {
        let found: Option<(User, String)> = users::table
            .filter(users::name.eq(name))
            .select((User::as_select(), users::login_code))
            .first(conn)
            .optional()?;
        let user = match found {
            Some((user, expected)) if secrets_match(login_code.trim(), &expected) => user,
            _ => {
                warn!("Rejected login for {name:?}");
                return Err(GiftError::Unauthorized);
            }
        };

        let token = Uuid::new_v4().to_string();
        diesel::insert_into(sessions::table)
            .values(&NewSession {
                user_id: user.id,
                token: token.clone(),
            })
            .execute(conn)?;

        Ok((user, token))
    })
}

/// Retrieves the user owning a session token, if the token is well formed and known.
#[cfg(feature = "ssr")]
pub fn get_user_by_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Option<User>, GiftError> {
    if Uuid::parse_str(token).is_err() {
        return Ok(None);
    }

    Ok(sessions::table
        .inner_join(users::table)
        .filter(sessions::token.eq(token))
        .select(User::as_select())
        .first(conn)
        .optional()?)
}

/// Resolves a session token to its user. A missing or unknown token is `Unauthorized`.
#[cfg(feature = "ssr")]
pub fn authenticate(conn: &mut SqliteConnection, token: Option<&str>) -> Result<User, GiftError> {
    match token {
        Some(token) => get_user_by_token(conn, token)?.ok_or(GiftError::Unauthorized),
        None => Err(GiftError::Unauthorized),
    }
}

/// Deletes a session. Returns number of affected rows.
#[cfg(feature = "ssr")]
pub fn logout_user(conn: &mut SqliteConnection, token: &str) -> Result<usize, GiftError> {
    Ok(diesel::delete(sessions::table.filter(sessions::token.eq(token))).execute(conn)?)
}

/// Opens an administrator session when `password` matches the configured one. Without a
/// configured password nobody can become administrator.
#[cfg(feature = "ssr")]
pub fn admin_login(
    conn: &mut SqliteConnection,
    password: &str,
    admin_password: Option<&str>,
) -> Result<String, GiftError> {
    match admin_password {
        Some(expected) if secrets_match(password, expected) => create_admin_session(conn),
        Some(_) => {
            warn!("Rejected administrator login");
            Err(GiftError::Unauthorized)
        }
        None => {
            warn!("Administrator login attempted but ADMIN_PASSWORD is not set");
            Err(GiftError::Unauthorized)
        }
    }
}

#[cfg(feature = "ssr")]
pub fn create_admin_session(conn: &mut SqliteConnection) -> Result<String, GiftError> {
    let token = Uuid::new_v4().to_string();
    diesel::insert_into(admin_sessions::table)
        .values(&NewAdminSession {
            token: token.clone(),
        })
        .execute(conn)?;
    info!("Opened administrator session");
    Ok(token)
}

/// Whether `token` belongs to an administrator session. User session tokens never qualify.
#[cfg(feature = "ssr")]
pub fn validate_admin_token(conn: &mut SqliteConnection, token: &str) -> Result<bool, GiftError> {
    if Uuid::parse_str(token).is_err() {
        return Ok(false);
    }

    let count: i64 = admin_sessions::table
        .filter(admin_sessions::token.eq(token))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

#[cfg(feature = "ssr")]
pub fn logout_admin(conn: &mut SqliteConnection, token: &str) -> Result<usize, GiftError> {
    Ok(
        diesel::delete(admin_sessions::table.filter(admin_sessions::token.eq(token)))
            .execute(conn)?,
    )
}

/// The authoritative cutoff is the most recently created one.
#[cfg(feature = "ssr")]
pub fn get_cutoff_time(conn: &mut SqliteConnection) -> Result<Option<CutoffTime>, GiftError> {
    Ok(cutoff_times::table
        .order((cutoff_times::created_at.desc(), cutoff_times::id.desc()))
        .select(CutoffTime::as_select())
        .first(conn)
        .optional()?)
}

#[cfg(feature = "ssr")]
pub fn set_cutoff_time(
    conn: &mut SqliteConnection,
    datetime: NaiveDateTime,
) -> Result<CutoffTime, GiftError> {
    let cutoff = diesel::insert_into(cutoff_times::table)
        .values(&NewCutoffTime { datetime })
        .returning(CutoffTime::as_returning())
        .get_result(conn)?;
    info!("Cutoff set to {datetime} UTC");
    Ok(cutoff)
}

#[cfg(feature = "ssr")]
pub fn get_cutoff_status(
    conn: &mut SqliteConnection,
    now: NaiveDateTime,
) -> Result<CutoffStatus, GiftError> {
    let cutoff = get_cutoff_time(conn)?.map(|c| c.datetime);
    Ok(CutoffStatus::at(cutoff, now))
}

/// Fails with `SubmissionClosed` once `now` has reached the current cutoff.
#[cfg(feature = "ssr")]
pub fn ensure_submissions_open(
    conn: &mut SqliteConnection,
    now: NaiveDateTime,
) -> Result<(), GiftError> {
    match get_cutoff_time(conn)? {
        Some(cutoff) if now >= cutoff.datetime => Err(GiftError::SubmissionClosed {
            cutoff: cutoff.datetime,
        }),
        _ => Ok(()),
    }
}

/// Replaces a user's entire prediction set in one transaction. Does not look at the cutoff.
#[cfg(feature = "ssr")]
pub fn sync_predictions(
    conn: &mut SqliteConnection,
    user_id: UserId,
    pairs: &ValidatedPairs,
) -> Result<(), GiftError> {
    let rows: Vec<NewPrediction> = pairs
        .pairs()
        .iter()
        .map(|p| NewPrediction {
            user_id,
            gifter_id: p.gifter_id,
            giftee_id: p.giftee_id,
        })
        .collect();

    conn.transaction::<_, GiftError, _>(|conn| {
        diesel::delete(predictions::table.filter(predictions::user_id.eq(user_id)))
            .execute(conn)?;
        if !rows.is_empty() {
            diesel::insert_into(predictions::table)
                .values(&rows)
                .execute(conn)?;
        }
        Ok(())
    })
}

/// Saves a user's predictions: checks the user exists and the cutoff has not passed, validates the
/// pairs against the roster, then replaces the stored set. All of it runs in one transaction,
/// which rolls back if `deadline` passes before it commits. Drops the user's cached predictions
/// on success.
#[cfg(feature = "ssr")]
pub fn save_predictions(
    conn: &mut SqliteConnection,
    cache: Option<&dyn Cache>,
    user_id: UserId,
    pairs: &[Pair],
    now: NaiveDateTime,
    forbid_self_pairs: bool,
    deadline: Option<Instant>,
) -> Result<ValidatedPairs, GiftError> {
    let validated = conn.transaction::<_, GiftError, _>(|conn| {
        let user_count: i64 = users::table
            .filter(users::id.eq(user_id))
            .count()
            .get_result(conn)?;
        if user_count == 0 {
            return Err(GiftError::UnknownUser(user_id));
        }

        ensure_submissions_open(conn, now)?;

        let roster = get_roster_ids(conn)?;
        let validated = validate_assignments(
            pairs,
            &roster,
            ValidationOptions::predictions(forbid_self_pairs),
        )?;
        sync_predictions(conn, user_id, &validated)?;
        check_deadline(deadline)?;
        Ok(validated)
    })?;

    if let Some(cache) = cache {
        cache.del(&predictions_cache_key(user_id));
    }
    info!("Saved {} predictions for user {user_id}", validated.len());
    Ok(validated)
}

/// Returns a user's predictions in insertion order.
#[cfg(feature = "ssr")]
pub fn get_user_predictions(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Vec<Pair>, GiftError> {
    let rows: Vec<Prediction> = predictions::table
        .filter(predictions::user_id.eq(user_id))
        .order(predictions::id.asc())
        .select(Prediction::as_select())
        .load(conn)?;
    Ok(rows.iter().map(Prediction::pair).collect())
}

#[cfg(feature = "ssr")]
fn predictions_version(conn: &mut SqliteConnection, user_id: UserId) -> Result<Version, GiftError> {
    Ok(predictions::table
        .filter(predictions::user_id.eq(user_id))
        .select(max(predictions::id))
        .get_result(conn)?)
}

#[cfg(feature = "ssr")]
pub fn get_cached_user_predictions(
    conn: &mut SqliteConnection,
    cache: Option<&dyn Cache>,
    user_id: UserId,
    ttl: Duration,
) -> Result<Vec<Pair>, GiftError> {
    cached(
        conn,
        cache,
        &predictions_cache_key(user_id),
        ttl,
        |conn| {
            conn.transaction::<_, GiftError, _>(|conn| {
                let pairs = get_user_predictions(conn, user_id)?;
                Ok((pairs, predictions_version(conn, user_id)?))
            })
        },
        |conn| predictions_version(conn, user_id),
    )
}

/// Replaces the global result set in one transaction. The set must cover the current roster.
#[cfg(feature = "ssr")]
pub fn sync_results(conn: &mut SqliteConnection, pairs: &ValidatedPairs) -> Result<(), GiftError> {
    let rows: Vec<NewResultEdge> = pairs
        .pairs()
        .iter()
        .map(|p| NewResultEdge {
            gifter_id: p.gifter_id,
            giftee_id: p.giftee_id,
        })
        .collect();

    conn.transaction::<_, GiftError, _>(|conn| {
        let roster = get_roster_ids(conn)?;
        check_complete(pairs, &roster)?;

        diesel::delete(results::table).execute(conn)?;
        if !rows.is_empty() {
            diesel::insert_into(results::table)
                .values(&rows)
                .execute(conn)?;
        }
        Ok(())
    })
}

/// Validates and stores the ground truth, then drops the cached leaderboard. Not subject to the
/// cutoff. Two concurrent saves resolve as last writer wins. Rolls back if `deadline` passes
/// before the transaction commits.
#[cfg(feature = "ssr")]
pub fn save_results(
    conn: &mut SqliteConnection,
    cache: Option<&dyn Cache>,
    pairs: &[Pair],
    forbid_self_pairs: bool,
    deadline: Option<Instant>,
) -> Result<ValidatedPairs, GiftError> {
    let validated = conn.transaction::<_, GiftError, _>(|conn| {
        let roster = get_roster_ids(conn)?;
        let validated =
            validate_assignments(pairs, &roster, ValidationOptions::results(forbid_self_pairs))?;
        sync_results(conn, &validated)?;
        check_deadline(deadline)?;
        Ok(validated)
    })?;

    if let Some(cache) = cache {
        cache.del(LEADERBOARD_CACHE_KEY);
    }
    info!("Saved {} results", validated.len());
    Ok(validated)
}

#[cfg(feature = "ssr")]
pub fn get_results(conn: &mut SqliteConnection) -> Result<Vec<Pair>, GiftError> {
    let rows: Vec<ResultEdge> = results::table
        .order(results::id.asc())
        .select(ResultEdge::as_select())
        .load(conn)?;
    Ok(rows.iter().map(ResultEdge::pair).collect())
}

#[cfg(feature = "ssr")]
fn results_version(conn: &mut SqliteConnection) -> Result<Version, GiftError> {
    Ok(results::table.select(max(results::id)).get_result(conn)?)
}

/// Everything scoring reads, taken from one read transaction.
#[cfg(feature = "ssr")]
struct ScoringSnapshot {
    users: Vec<UserSummary>,
    predictions: Vec<OwnedPair>,
    results: Vec<Pair>,
    results_version: Version,
}

#[cfg(feature = "ssr")]
fn load_scoring_snapshot(conn: &mut SqliteConnection) -> Result<ScoringSnapshot, GiftError> {
    conn.transaction::<_, GiftError, _>(|conn| {
        let users = users::table
            .order(users::id.asc())
            .select(UserSummary::as_select())
            .load(conn)?;
        let predictions: Vec<Prediction> = predictions::table
            .order(predictions::id.asc())
            .select(Prediction::as_select())
            .load(conn)?;
        let results = get_results(conn)?;
        let results_version = results_version(conn)?;

        Ok(ScoringSnapshot {
            users,
            predictions: predictions.iter().map(Prediction::owned_pair).collect(),
            results,
            results_version,
        })
    })
}

#[cfg(feature = "ssr")]
fn load_leaderboard(
    conn: &mut SqliteConnection,
) -> Result<(Vec<RankedScore>, Version), GiftError> {
    let snapshot = load_scoring_snapshot(conn)?;
    let board = compute_leaderboard(&snapshot.users, &snapshot.predictions, &snapshot.results);
    Ok((board, snapshot.results_version))
}

/// Computes the leaderboard from the stored predictions and results, bypassing any cache.
#[cfg(feature = "ssr")]
pub fn compute_current_leaderboard(
    conn: &mut SqliteConnection,
) -> Result<Vec<RankedScore>, GiftError> {
    load_leaderboard(conn).map(|(board, _)| board)
}

/// Returns the leaderboard, from the cache when a fresh entry exists.
#[cfg(feature = "ssr")]
pub fn get_leaderboard(
    conn: &mut SqliteConnection,
    cache: Option<&dyn Cache>,
    ttl: Duration,
) -> Result<Vec<RankedScore>, GiftError> {
    cached(
        conn,
        cache,
        LEADERBOARD_CACHE_KEY,
        ttl,
        load_leaderboard,
        results_version,
    )
}

#[cfg(feature = "ssr")]
pub fn get_result_reveal(conn: &mut SqliteConnection) -> Result<Vec<RevealedPair>, GiftError> {
    let snapshot = load_scoring_snapshot(conn)?;
    Ok(result_reveal(
        &snapshot.users,
        &snapshot.predictions,
        &snapshot.results,
    ))
}

/// Clears user and administrator sessions, predictions, results and cutoffs. Participants and
/// users are kept.
#[cfg(feature = "ssr")]
pub fn reset_database(conn: &mut SqliteConnection) -> Result<(), GiftError> {
    conn.transaction::<_, GiftError, _>(|conn| {
        diesel::delete(sessions::table).execute(conn)?;
        diesel::delete(admin_sessions::table).execute(conn)?;
        diesel::delete(predictions::table).execute(conn)?;
        diesel::delete(results::table).execute(conn)?;
        diesel::delete(cutoff_times::table).execute(conn)?;
        Ok(())
    })
}
