//! Page List - Keeps a page's entry in the site's page list in sync.
//!
//! Two operations against the page store and a JSON transport:
//!
//! - [`update_page_list`] - merge new title/authors, record the current user,
//!   commit locally, and post the entry to `{prefix}/_pagelist`
//! - [`get_list_data`] - look the page up in the search index and commit (or,
//!   when preloading, return) its title/authors/update time
//!
//! The transport is injected through [`JsonClient`], so hosts choose their
//! own HTTP stack and tests use a recording fake.

use std::cell::RefCell;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Route of the site's page list endpoint, relative to the site prefix.
pub const PAGE_LIST_ROUTE: &str = "/_pagelist";

/// Route of the search endpoint, relative to the site prefix.
pub const SEARCH_ROUTE: &str = "/_search";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum PageListError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("malformed page list response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("site prefix is not set")]
    MissingPrefix,
}

// =============================================================================
// Transport
// =============================================================================

/// Posts a JSON body and returns the decoded JSON response.
pub trait JsonClient {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, PageListError>;
}

// =============================================================================
// State
// =============================================================================

/// A page's list metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    /// Serialized as an ISO-8601 string, the way browsers write dates.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "js_date")]
    pub update_time: Option<DateTime<Utc>>,
    /// Everyone who has edited the page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
}

/// Fields an update may override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageListUpdate {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub site_prefix: Option<String>,
    pub page_uri: Option<String>,
    pub list_data: ListData,
    pub username: Option<String>,
}

/// The slice of editor state the page-list sync reads and commits to.
#[derive(Debug, Default)]
pub struct PageStore {
    state: RefCell<PageState>,
}

impl PageStore {
    pub fn new(state: PageState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn state(&self) -> PageState {
        self.state.borrow().clone()
    }

    pub fn list_data(&self) -> ListData {
        self.state.borrow().list_data.clone()
    }

    /// Replace title, authors and update time. Users are kept.
    pub fn commit_list_data(&self, data: ListData) {
        let mut state = self.state.borrow_mut();
        let list_data = &mut state.list_data;
        list_data.title = data.title;
        list_data.authors = data.authors;
        list_data.update_time = data.update_time;
    }

    fn add_user(&self, username: &str) -> Vec<String> {
        let mut state = self.state.borrow_mut();
        let users = &mut state.list_data.users;
        if !users.iter().any(|u| u == username) {
            users.push(username.to_string());
        }
        users.clone()
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Update the page's list entry.
///
/// Without overrides this only bumps the update time and records the user.
pub fn update_page_list(
    store: &PageStore,
    client: &dyn JsonClient,
    update: PageListUpdate,
) -> Result<Value, PageListError> {
    let state = store.state();
    let prefix = state.site_prefix.ok_or(PageListError::MissingPrefix)?;

    let title = update.title.or(state.list_data.title);
    let authors = update.authors.or(state.list_data.authors);
    let update_time = Utc::now();
    let users = match &state.username {
        Some(username) => store.add_user(username),
        None => state.list_data.users,
    };

    store.commit_list_data(ListData {
        title: title.clone(),
        authors: authors.clone(),
        update_time: Some(update_time),
        users: Vec::new(),
    });

    let body = json!({
        "url": state.page_uri,
        "value": {
            "title": title,
            "authors": authors,
            "updateTime": js_date::format(&update_time),
            "users": users,
        }
    });
    let url = format!("{prefix}{PAGE_LIST_ROUTE}");
    log::debug!("posting page list entry for {:?} to {url}", state.page_uri);
    client.post_json(&url, &body)
}

/// Fetch a page's list data from the search index.
///
/// With `prefix` (preloading, site not in the store yet) the data is
/// returned and nothing is committed. Without it the data is committed and
/// `None` is returned. Lookup failures resolve to empty data.
pub fn get_list_data(
    store: &PageStore,
    client: &dyn JsonClient,
    uri: &str,
    prefix: Option<&str>,
) -> Option<ListData> {
    let data = fetch_list_data(store, client, uri, prefix).unwrap_or_else(|err| {
        log::warn!("page list lookup for {uri} failed: {err}");
        ListData::default()
    });

    if prefix.is_some() {
        Some(data)
    } else {
        store.commit_list_data(data);
        None
    }
}

fn fetch_list_data(
    store: &PageStore,
    client: &dyn JsonClient,
    uri: &str,
    prefix: Option<&str>,
) -> Result<ListData, PageListError> {
    let site_prefix = match prefix {
        Some(prefix) => prefix.to_string(),
        None => store
            .state()
            .site_prefix
            .ok_or(PageListError::MissingPrefix)?,
    };

    let query = json!({
        "index": "pages",
        "type": "general",
        "body": {
            "size": 1,
            "query": { "term": { "uri": uri } }
        }
    });
    let response = client.post_json(&format!("{site_prefix}{SEARCH_ROUTE}"), &query)?;

    let Some(source) = response.pointer("/hits/hits/0/_source") else {
        return Ok(ListData::default());
    };
    let hit: ListData = serde_json::from_value(source.clone())?;
    Ok(ListData {
        users: Vec::new(),
        ..hit
    })
}

/// Dates as JavaScript's `Date#toJSON` writes them (`2017-03-01T12:00:00.000Z`).
///
/// Reading also accepts any RFC 3339 offset and epoch milliseconds.
mod js_date {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&format(date)),
            None => serializer.serialize_none(),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        Millis(i64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawDate>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawDate::Text(text)) => DateTime::parse_from_rfc3339(&text)
                .map(|date| Some(date.with_timezone(&Utc)))
                .map_err(D::Error::custom),
            Some(RawDate::Millis(millis)) => DateTime::from_timestamp_millis(millis)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp {millis} out of range"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    /// Records requests and answers with a canned response.
    struct FakeClient {
        response: Result<Value, String>,
        requests: RefCell<Vec<(String, Value)>>,
    }

    impl FakeClient {
        fn ok(response: Value) -> Self {
            Self {
                response: Ok(response),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err("connection refused".into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl JsonClient for FakeClient {
        fn post_json(&self, url: &str, body: &Value) -> Result<Value, PageListError> {
            self.requests
                .borrow_mut()
                .push((url.to_string(), body.clone()));
            self.response.clone().map_err(|message| PageListError::Transport {
                url: url.to_string(),
                message,
            })
        }
    }

    fn store() -> PageStore {
        PageStore::new(PageState {
            site_prefix: Some("example.com".into()),
            page_uri: Some("example.com/_pages/home".into()),
            list_data: ListData {
                title: Some("Home".into()),
                authors: Some(vec!["Ada".into()]),
                update_time: Some(Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()),
                users: vec!["grace".into()],
            },
            username: Some("linus".into()),
        })
    }

    #[test]
    fn test_update_merges_and_posts() {
        let store = store();
        let client = FakeClient::ok(json!({}));

        update_page_list(
            &store,
            &client,
            PageListUpdate {
                title: Some("Welcome".into()),
                authors: None,
            },
        )
        .unwrap();

        let requests = client.requests.borrow();
        let (url, body) = &requests[0];
        assert_eq!(url, "example.com/_pagelist");
        assert_eq!(body["url"], "example.com/_pages/home");
        assert_eq!(body["value"]["title"], "Welcome");
        assert_eq!(body["value"]["authors"], json!(["Ada"]));
        assert_eq!(body["value"]["users"], json!(["grace", "linus"]));

        let posted = body["value"]["updateTime"].as_str().unwrap();
        assert!(posted.ends_with('Z'));
        assert_eq!(posted.len(), "2017-03-01T12:00:00.000Z".len());
        let committed = store.list_data().update_time.unwrap();
        assert_eq!(posted, js_date::format(&committed));
        assert!(committed.year() > 2016);

        let data = store.list_data();
        assert_eq!(data.title.as_deref(), Some("Welcome"));
        assert_eq!(data.users, vec!["grace".to_string(), "linus".to_string()]);
    }

    #[test]
    fn test_update_adds_user_once() {
        let store = store();
        let client = FakeClient::ok(json!({}));
        update_page_list(&store, &client, PageListUpdate::default()).unwrap();
        update_page_list(&store, &client, PageListUpdate::default()).unwrap();

        assert_eq!(store.list_data().users.len(), 2);
        let requests = client.requests.borrow();
        assert_eq!(requests[1].1["value"]["users"], json!(["grace", "linus"]));
    }

    #[test]
    fn test_update_without_prefix_fails() {
        let store = PageStore::default();
        let client = FakeClient::ok(json!({}));
        let result = update_page_list(&store, &client, PageListUpdate::default());
        assert!(matches!(result, Err(PageListError::MissingPrefix)));
        assert!(client.requests.borrow().is_empty());
    }

    #[test]
    fn test_get_list_data_commits_first_hit() {
        let store = store();
        let client = FakeClient::ok(json!({
            "hits": { "hits": [{ "_source": {
                "title": "Indexed",
                "authors": ["Bea"],
                "updateTime": "2017-03-01T12:00:00.000Z",
                "published": true
            }}]}
        }));

        assert_eq!(get_list_data(&store, &client, "example.com/_pages/home", None), None);

        let requests = client.requests.borrow();
        let (url, query) = &requests[0];
        assert_eq!(url, "example.com/_search");
        assert_eq!(query["index"], "pages");
        assert_eq!(query["type"], "general");
        assert_eq!(query["body"]["size"], 1);
        assert_eq!(query["body"]["query"]["term"]["uri"], "example.com/_pages/home");

        let data = store.list_data();
        assert_eq!(data.title.as_deref(), Some("Indexed"));
        assert_eq!(data.authors, Some(vec!["Bea".to_string()]));
        assert_eq!(
            data.update_time,
            Some(Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(data.users, vec!["grace".to_string()]);
    }

    #[test]
    fn test_get_list_data_preload_returns_without_commit() {
        let store = PageStore::default();
        let client = FakeClient::ok(json!({
            "hits": { "hits": [{ "_source": { "title": "Indexed" } }] }
        }));

        let data = get_list_data(&store, &client, "p", Some("other.com")).unwrap();
        assert_eq!(data.title.as_deref(), Some("Indexed"));
        assert_eq!(client.requests.borrow()[0].0, "other.com/_search");
        assert_eq!(store.list_data(), ListData::default());
    }

    #[test]
    fn test_get_list_data_falls_back_on_error() {
        let store = store();
        assert_eq!(get_list_data(&store, &FakeClient::failing(), "p", None), None);
        let data = store.list_data();
        assert_eq!(data.title, None);
        assert_eq!(data.update_time, None);

        let preloaded = get_list_data(&store, &FakeClient::failing(), "p", Some("x"));
        assert_eq!(preloaded, Some(ListData::default()));
    }

    #[test]
    fn test_get_list_data_without_hits_is_empty() {
        let store = PageStore::default();
        let client = FakeClient::ok(json!({ "hits": { "hits": [] } }));
        assert_eq!(
            get_list_data(&store, &client, "p", Some("x")),
            Some(ListData::default())
        );
    }

    #[test]
    fn test_hit_with_epoch_millis_decodes() {
        let store = PageStore::default();
        let client = FakeClient::ok(json!({
            "hits": { "hits": [{ "_source": {
                "title": "Legacy",
                "updateTime": 1488369600000_i64
            }}]}
        }));

        let data = get_list_data(&store, &client, "p", Some("x")).unwrap();
        assert_eq!(data.title.as_deref(), Some("Legacy"));
        assert_eq!(
            data.update_time,
            Some(Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_list_data_writes_browser_dates() {
        let data = ListData {
            title: Some("Home".into()),
            update_time: Some(Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap()),
            ..Default::default()
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["updateTime"], "2017-03-01T12:00:00.000Z");

        let back: ListData = serde_json::from_value(value).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_offset_dates_normalize_to_utc() {
        let data: ListData =
            serde_json::from_value(json!({ "updateTime": "2017-03-01T13:00:00+01:00" })).unwrap();
        assert_eq!(
            data.update_time,
            Some(Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unparseable_date_is_a_decode_error() {
        let store = store();
        let client = FakeClient::ok(json!({
            "hits": { "hits": [{ "_source": { "title": "T", "updateTime": "yesterday" } }] }
        }));
        let err = fetch_list_data(&store, &client, "p", None).unwrap_err();
        assert!(matches!(err, PageListError::Decode(_)));
    }

    #[test]
    fn test_malformed_hit_is_a_decode_error() {
        let store = store();
        let client = FakeClient::ok(json!({
            "hits": { "hits": [{ "_source": { "title": 7 } }] }
        }));
        let err = fetch_list_data(&store, &client, "p", None).unwrap_err();
        assert!(matches!(err, PageListError::Decode(_)));
    }
}
