//! Hero fixtures shared by the integration tests

use gqlcache::selection::{Field, Fragment, OutputType, ScalarType, Selection, Variables};
use gqlcache::{GraphQLResponse, Operation, RecordSet, Store};
use serde_json::{json, Value};

pub fn string() -> OutputType {
    OutputType::scalar(ScalarType::String)
}

/// `{ hero { name friends { name } } }`
pub fn hero_and_friends_query() -> Operation {
    Operation::query(
        "HeroAndFriendsNames",
        vec![Selection::field(
            "hero",
            OutputType::object(vec![
                Selection::field("name", OutputType::non_null(string())),
                Selection::field(
                    "friends",
                    OutputType::list(OutputType::object(vec![Selection::field("name", string())])),
                ),
            ]),
        )],
    )
}

/// `{ hero { name } }`
pub fn hero_name_query() -> Operation {
    Operation::query(
        "HeroName",
        vec![Selection::field(
            "hero",
            OutputType::object(vec![Selection::field("name", OutputType::non_null(string()))]),
        )],
    )
}

/// `{ hero(episode: $episode) { __typename id name } }`
pub fn hero_by_episode_query() -> Operation {
    Operation::query(
        "HeroByEpisode",
        vec![Selection::Field(
            Field::new(
                "hero",
                OutputType::object(vec![
                    Selection::field("__typename", OutputType::non_null(string())),
                    Selection::field("id", OutputType::non_null(OutputType::scalar(ScalarType::ID))),
                    Selection::field("name", string()),
                ]),
            )
            .with_argument("episode", gqlcache::selection::InputValue::variable("episode")),
        )],
    )
}

/// `{ hero { __typename name ...DroidDetails } }`
pub fn hero_with_fragment_query() -> Operation {
    Operation::query(
        "HeroDetails",
        vec![Selection::field(
            "hero",
            OutputType::object(vec![
                Selection::field("__typename", OutputType::non_null(string())),
                Selection::field("name", string()),
                Selection::FragmentSpread(Fragment::new(
                    "DroidDetails",
                    vec!["Droid".to_string()],
                    vec![Selection::field("primaryFunction", string())],
                )),
            ]),
        )],
    )
}

pub fn hero_and_friends_data(friends: &[&str]) -> Value {
    let friends: Vec<Value> = friends.iter().map(|name| json!({ "name": name })).collect();
    json!({ "data": { "hero": { "name": "R2-D2", "friends": friends } } })
}

pub fn variables(value: Value) -> Variables {
    value.as_object().cloned().unwrap_or_default()
}

/// Normalize `body` as the response to `operation`
pub fn normalize(store: &Store, operation: &Operation, variables: &Variables, body: Value) -> RecordSet {
    let response = GraphQLResponse::from_value(body).expect("Failed to parse response");
    let (_, records) = response
        .parse_result(operation, variables, store.cache_key_resolver())
        .expect("Failed to normalize response");
    records.expect("Response carried no data")
}

/// Store holding R2-D2 and the given friends
pub fn seeded_store(store: Store, friends: &[&str]) -> Store {
    let operation = hero_and_friends_query();
    let records = normalize(&store, &operation, &Variables::new(), hero_and_friends_data(friends));
    store.publish(records, None).expect("Failed to publish");
    store
}
