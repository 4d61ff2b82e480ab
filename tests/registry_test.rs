//! Registry integration tests
//! Run with: cargo test --test registry_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;

use helga::application::errors::{BotError, PluginError, PluginResult, RegistryError};
use helga::application::messaging::CommandParser;
use helga::domain::entities::{Message, Response};
use helga::domain::traits::Client;
use helga::plugins::{
    CatalogSource, Command, Context, Plugin, PluginEntry, Preprocessor, Registry, RegistrySettings, Reload, Signal,
    SignalSink,
};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

struct Bot;

#[async_trait]
impl Client for Bot {
    fn nickname(&self) -> &str {
        "helga"
    }

    async fn send_message(&self, _channel: &str, _text: &str) -> Result<(), BotError> {
        Ok(())
    }
}

/// Plugin with a fixed priority and a canned outcome
struct Canned {
    priority: i32,
    outcome: PluginResult<Response>,
    calls: Arc<AtomicUsize>,
}

impl Canned {
    fn new(priority: i32, outcome: PluginResult<Response>) -> Self {
        Self {
            priority,
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn replying(priority: i32, reply: impl Into<Response>) -> Self {
        Self::new(priority, Ok(reply.into()))
    }
}

impl Plugin for Canned {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn process(&self, _ctx: &Context<'_>, _message: &Message) -> PluginResult<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

#[derive(Default)]
struct CountingSink {
    loaded: AtomicUsize,
}

impl SignalSink for CountingSink {
    fn emit(&self, signal: Signal) {
        if signal == Signal::PluginsLoaded {
            self.loaded.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn registry_with(settings: RegistrySettings, source: CatalogSource) -> (Registry, Arc<CountingSink>) {
    ensure_init();
    let sink = Arc::new(CountingSink::default());
    let registry = Registry::new(settings, Box::new(source), sink.clone());
    (registry, sink)
}

fn registry() -> Registry {
    registry_with(RegistrySettings::default(), CatalogSource::new()).0
}

fn decorated(plugins: Vec<Canned>) -> PluginEntry {
    PluginEntry::Decorated(
        plugins
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn Plugin>)
            .collect(),
    )
}

fn message(text: &str) -> Message {
    Message::new("#bots", "me", text)
}

#[test]
fn test_prioritized_expands_decorated_entries() {
    let mut registry = registry();
    registry.register("foo", PluginEntry::instance(Canned::replying(50, "foo"))).unwrap();
    registry
        .register(
            "decorated",
            decorated(vec![
                Canned::replying(10, "bar"),
                Canned::replying(0, "baz"),
                Canned::replying(99, "☃"),
            ]),
        )
        .unwrap();
    registry.enable("#bots", ["foo", "decorated", "not-installed"]);

    let high_to_low: Vec<i32> = registry.prioritized("#bots", true).iter().map(|p| p.priority()).collect();
    assert_eq!(high_to_low, vec![99, 50, 10, 0]);

    let low_to_high: Vec<i32> = registry.prioritized("#bots", false).iter().map(|p| p.priority()).collect();
    assert_eq!(low_to_high, vec![0, 10, 50, 99]);

    assert!(registry.prioritized("#elsewhere", true).is_empty());
}

/// Registry where the answers in priority order are
/// `""`, `["foo", "bar", <hole>]`, nothing, `"☃"` and `"baz"`
fn answering_registry(settings: RegistrySettings) -> Registry {
    let (mut registry, _) = registry_with(settings, CatalogSource::new());
    registry.register("quiet", PluginEntry::instance(Canned::replying(99, ""))).unwrap();
    registry
        .register(
            "chatty",
            PluginEntry::instance(Canned::replying(50, vec![Some("foo"), Some("bar"), None])),
        )
        .unwrap();
    registry
        .register(
            "others",
            decorated(vec![Canned::replying(0, "baz"), Canned::replying(10, "☃"), Canned::replying(30, ())]),
        )
        .unwrap();
    registry.enable("#bots", ["quiet", "chatty", "others"]);
    registry
}

/// What each plugin answers on its own, in the given order
fn answers(plugins: &[Arc<dyn Plugin>]) -> Vec<String> {
    let parser = CommandParser::default();
    let ctx = Context::new(&Bot, &parser);
    plugins
        .iter()
        .flat_map(|p| p.process(&ctx, &message("hi")).unwrap().into_lines())
        .collect()
}

#[test]
fn test_process_collects_responses_in_priority_order() {
    let registry = answering_registry(RegistrySettings::default());
    assert_eq!(registry.process(&Bot, &message("hi")), vec!["foo", "bar", "☃", "baz"]);
}

#[test]
fn test_first_responder_only_keeps_first_answer() {
    let registry = answering_registry(RegistrySettings {
        first_responder_only: true,
        ..Default::default()
    });
    assert_eq!(registry.process(&Bot, &message("hi")), vec!["foo", "bar"]);
}

#[test]
fn test_equal_priorities_keep_expansion_order() {
    let mut registry = registry();
    registry
        .register(
            "d",
            decorated(vec![Canned::replying(5, "a"), Canned::replying(5, "b"), Canned::replying(5, "c")]),
        )
        .unwrap();
    registry.register("e", PluginEntry::instance(Canned::replying(5, "z"))).unwrap();
    registry.register("b", PluginEntry::instance(Canned::replying(5, "first"))).unwrap();
    registry.register("top", PluginEntry::instance(Canned::replying(9, "top"))).unwrap();
    registry.enable("#bots", ["e", "top", "d", "b"]);

    assert_eq!(
        answers(&registry.prioritized("#bots", true)),
        vec!["top", "first", "a", "b", "c", "z"]
    );
    assert_eq!(
        answers(&registry.prioritized("#bots", false)),
        vec!["first", "a", "b", "c", "z", "top"]
    );
    assert_eq!(
        registry.process(&Bot, &message("hi")),
        vec!["top", "first", "a", "b", "c", "z"]
    );
}

#[test]
fn test_help_lists_enabled_commands() {
    let mut registry = registry();
    registry
        .register("ping", PluginEntry::instance(Command::new("ping").with_help("Check the bot is alive")))
        .unwrap();
    registry
        .register("echo", PluginEntry::instance(Command::new("echo").with_aliases(["say"]).with_help("Repeat")))
        .unwrap();
    registry.register("silent", PluginEntry::instance(Canned::replying(0, "x"))).unwrap();
    registry.enable("#bots", ["ping", "echo", "silent"]);

    assert_eq!(registry.help("#bots"), vec!["echo, say: Repeat", "ping: Check the bot is alive"]);
    assert!(registry.help("#elsewhere").is_empty());
}

#[test]
fn test_not_ready_ends_the_round() {
    let mut registry = registry();
    let last = Canned::replying(10, "never");
    let last_calls = last.calls.clone();

    registry.register("first", PluginEntry::instance(Canned::replying(30, "one"))).unwrap();
    registry
        .register("waiting", PluginEntry::instance(Canned::new(20, Err(PluginError::NotReady))))
        .unwrap();
    registry.register("last", PluginEntry::instance(last)).unwrap();
    registry.enable("#bots", ["first", "waiting", "last"]);

    assert_eq!(registry.process(&Bot, &message("hi")), vec!["one"]);
    assert_eq!(last_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failing_plugins_are_skipped() {
    let mut registry = registry();
    registry
        .register(
            "broken",
            PluginEntry::instance(Canned::new(99, Err(PluginError::Failed("boom".to_string())))),
        )
        .unwrap();
    registry.register("fine", PluginEntry::instance(Canned::replying(0, "ok"))).unwrap();
    registry.enable("#bots", ["broken", "fine"]);

    assert_eq!(registry.process(&Bot, &message("hi")), vec!["ok"]);
}

#[test]
fn test_register_rejects_undecorated_functions() {
    let mut registry = registry();

    let result = registry.register("plain", PluginEntry::Decorated(Vec::new()));
    assert!(matches!(result, Err(RegistryError::InvalidPlugin(_))));
    assert!(registry.get_plugin("plain").is_none());

    registry.register("☃", PluginEntry::instance(Canned::replying(0, "snow"))).unwrap();
    registry.register("foo", PluginEntry::instance(Canned::replying(0, "foo"))).unwrap();

    assert!(registry.get_plugin("☃").is_some());
    assert_eq!(registry.all_plugins().into_iter().collect::<Vec<_>>(), vec!["foo", "☃"]);
}

#[test]
fn test_register_replaces_previous_entry() {
    let mut registry = registry();
    registry.register("foo", PluginEntry::instance(Canned::replying(0, "old"))).unwrap();
    registry.register("foo", PluginEntry::instance(Canned::replying(0, "new"))).unwrap();
    registry.enable("#bots", ["foo"]);

    assert_eq!(registry.process(&Bot, &message("hi")), vec!["new"]);
}

#[test]
fn test_enable_and_disable_per_channel() {
    let mut registry = registry();
    registry.enable("#bots", ["foo", "bar"]);
    registry.enable("#other", ["bar"]);
    registry.disable("#bots", ["bar", "never-enabled"]);
    registry.disable("#unknown", ["foo"]);

    assert!(registry.is_enabled("#bots", "foo"));
    assert!(!registry.is_enabled("#bots", "bar"));
    assert!(registry.is_enabled("#other", "bar"));
    assert_eq!(registry.enabled("#bots").collect::<Vec<_>>(), vec!["foo"]);
    assert_eq!(registry.enabled("#unknown").count(), 0);
}

#[test]
fn test_enable_defaults_uses_configured_list() {
    let settings = RegistrySettings {
        default_channel: vec!["ping".to_string(), "greet".to_string()],
        ..Default::default()
    };
    let (mut registry, _) = registry_with(settings, CatalogSource::new());
    registry.enable_defaults("#new");

    assert_eq!(registry.enabled("#new").collect::<Vec<_>>(), vec!["greet", "ping"]);
}

#[test]
fn test_load_skips_failing_entries() {
    let source = CatalogSource::new()
        .with("foo", || Ok(PluginEntry::instance(Canned::replying(0, "foo"))))
        .with("bar", || Ok(PluginEntry::instance(Canned::replying(0, "bar"))))
        .with("broken", || Err(PluginError::Resolve("import error".to_string())));
    let (mut registry, sink) = registry_with(RegistrySettings::default(), source);

    assert_eq!(registry.load(), 2);
    assert_eq!(registry.all_plugins().into_iter().collect::<Vec<_>>(), vec!["bar", "foo"]);
    assert_eq!(sink.loaded.load(Ordering::SeqCst), 1);
}

#[test]
fn test_load_honours_allow_and_deny() {
    let source = CatalogSource::new()
        .with("foo", || Ok(PluginEntry::instance(Canned::replying(0, "foo"))))
        .with("bar", || Ok(PluginEntry::instance(Canned::replying(0, "bar"))))
        .with("baz", || Ok(PluginEntry::instance(Canned::replying(0, "baz"))));
    let settings = RegistrySettings {
        allow: Some(vec!["foo".to_string(), "bar".to_string()]),
        deny: vec!["bar".to_string()],
        ..Default::default()
    };
    let (mut registry, _) = registry_with(settings, source);

    assert_eq!(registry.load(), 1);
    assert_eq!(registry.all_plugins().into_iter().collect::<Vec<_>>(), vec!["foo"]);
}

#[test]
fn test_reload_unknown_plugin() {
    let mut registry = registry();
    let outcome = registry.reload("missing");

    assert!(!outcome.is_success());
    assert!(outcome.to_string().contains("Unknown plugin"));
    assert!(registry.all_plugins().is_empty());
}

#[test]
fn test_reload_swaps_in_fresh_entry() {
    let version = Arc::new(AtomicUsize::new(0));
    let counter = version.clone();
    let source = CatalogSource::new().with("versioned", move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(PluginEntry::instance(Canned::replying(0, format!("v{}", n))))
    });
    let (mut registry, _) = registry_with(RegistrySettings::default(), source);
    registry.load();
    registry.enable("#bots", ["versioned"]);
    assert_eq!(registry.process(&Bot, &message("hi")), vec!["v0"]);

    assert_eq!(registry.reload("versioned"), Reload::Reloaded);
    assert_eq!(registry.process(&Bot, &message("hi")), vec!["v1"]);
}

#[test]
fn test_failed_reload_keeps_previous_entry() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let source = CatalogSource::new().with("flaky", move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(PluginEntry::instance(Canned::replying(0, "first")))
        } else {
            Err(PluginError::Resolve("syntax error".to_string()))
        }
    });
    let (mut registry, _) = registry_with(RegistrySettings::default(), source);
    registry.load();
    registry.enable("#bots", ["flaky"]);

    assert!(matches!(registry.reload("flaky"), Reload::Failed(_)));
    assert_eq!(registry.process(&Bot, &message("hi")), vec!["first"]);
}

#[test]
fn test_preprocess_chains_rewrites() {
    let mut registry = registry();
    let upper = Preprocessor::new(|_, m: Message| {
        let text = m.text.to_uppercase();
        Ok(m.with_text(text))
    })
    .with_priority(10);
    let broken = Preprocessor::new(|_, _| Err(PluginError::Failed("nope".to_string()))).with_priority(7);
    let bang = Preprocessor::new(|_, m: Message| {
        let text = format!("{}!", m.text);
        Ok(m.with_text(text))
    })
    .with_priority(5);

    registry.register("upper", PluginEntry::instance(upper)).unwrap();
    registry.register("broken", PluginEntry::instance(broken)).unwrap();
    registry.register("bang", PluginEntry::instance(bang)).unwrap();
    registry.enable("#bots", ["upper", "broken", "bang"]);

    let rewritten = registry.preprocess(&Bot, message("hi"));
    assert_eq!(rewritten.text, "HI!");
    assert_eq!(rewritten.nick, "me");
}

#[test]
fn test_commands_dispatch_through_registry() {
    let mut registry = registry();
    let echo = Command::new("echo")
        .with_aliases(["say"])
        .with_runner(|_, _, command, args| Ok(Response::text(format!("{}: {}", command, args.join(" ")))));
    registry.register("echo", PluginEntry::instance(echo)).unwrap();
    registry.enable("#bots", ["echo"]);

    assert_eq!(registry.process(&Bot, &message("!say hello world")), vec!["say: hello world"]);
    assert_eq!(registry.process(&Bot, &message("helga: echo hi")), vec!["echo: hi"]);
    assert!(registry.process(&Bot, &message("echo hi")).is_empty());
}
