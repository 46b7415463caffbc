//! Task routing: deciding which worker receives a task.
//!
//! Routing is a three-stage fallback evaluated per task string:
//!
//! 1. **Query cache**: the exact task text seen before returns the
//!    cached route with no recomputation. Two textually different
//!    strings are cached independently even when they mean the same
//!    thing.
//! 2. **Semantic recall**: when a cortex is attached, a recalled past
//!    decision is mapped back to a persona by skill-set overlap. Any
//!    cortex failure is a miss, never an error.
//! 3. **Keyword rules**: personas are evaluated in descending priority
//!    order so that a more specific category (reviewer keywords such as
//!    "commit", "test", "git") beats a more general one (coder keywords
//!    such as "write", "implement") when both match. No match routes to
//!    the default persona.
//!
//! Freshly computed keyword routes are written back to the cortex so
//! future similar tasks can take the semantic path.

use crate::decision::{context_keys, AgentRoute, TaskContext};
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, OnceLock};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use waggle_cortex::{Cortex, RoutingDecision};

/// Pre-compiled regex for leading @mention parsing (e.g., "@reviewer check this")
static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+)\s+").expect("MENTION_REGEX is a compile-time constant"));

/// Confidence assigned to a single-keyword match.
const KEYWORD_BASE_CONFIDENCE: f32 = 0.7;
/// Confidence bonus per additional matched keyword.
const KEYWORD_MATCH_BONUS: f32 = 0.05;
/// Confidence assigned to the no-match default route.
const DEFAULT_ROUTE_CONFIDENCE: f32 = 0.3;

/// A worker's declared routing profile: the keywords that attract tasks
/// to it and the skills it exercises.
#[derive(Debug, Clone)]
pub struct Persona {
    /// Worker name the persona routes to.
    pub name: String,
    /// Keywords that attract tasks to this persona.
    pub keywords: HashSet<String>,
    /// Skill names the persona exercises.
    pub skills: HashSet<String>,
    /// Evaluation priority; higher is checked first.
    pub priority: u32,
}

impl Persona {
    /// Create a persona with no keywords or skills.
    #[must_use]
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            keywords: HashSet::new(),
            skills: HashSet::new(),
            priority,
        }
    }

    /// Set the keyword set.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the skill set.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Review/QA persona. Highest priority: repository hygiene keywords
    /// are more specific than coding ones and win when both appear.
    #[must_use]
    pub fn reviewer() -> Self {
        Self::new("reviewer", 100)
            .with_keywords(["commit", "test", "git", "review", "merge"])
            .with_skills(["git", "testing", "review"])
    }

    /// Coding persona.
    #[must_use]
    pub fn coder() -> Self {
        Self::new("coder", 80)
            .with_keywords(["write", "implement", "refactor", "code", "fix", "debug"])
            .with_skills(["code", "editor", "refactor"])
    }

    /// Research persona.
    #[must_use]
    pub fn researcher() -> Self {
        Self::new("researcher", 60)
            .with_keywords(["research", "investigate", "compare", "explore"])
            .with_skills(["search", "web", "docs"])
    }

    /// Default coordination persona; matches nothing by keyword and
    /// receives whatever the others decline.
    #[must_use]
    pub fn orchestrator() -> Self {
        Self::new("orchestrator", 0).with_skills(["routing", "planning", "coordination"])
    }

    /// The default persona table.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::reviewer(),
            Self::coder(),
            Self::researcher(),
            Self::orchestrator(),
        ]
    }
}

/// Decides which worker name receives a task string.
pub struct HiveRouter {
    /// Personas sorted by descending priority at construction.
    personas: Vec<Persona>,
    /// Worker receiving tasks no keyword rule matches.
    default_persona: String,
    /// Optional semantic memory.
    cortex: Option<Arc<dyn Cortex>>,
    /// Routes keyed by the verbatim task string.
    cache: RwLock<HashMap<String, AgentRoute>>,
}

impl HiveRouter {
    /// Create a router over the default persona table, without a cortex.
    #[must_use]
    pub fn new() -> Self {
        Self::with_personas(Persona::defaults(), "orchestrator")
    }

    /// Create a router over a custom persona table.
    #[must_use]
    pub fn with_personas(mut personas: Vec<Persona>, default_persona: impl Into<String>) -> Self {
        personas.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self {
            personas,
            default_persona: default_persona.into(),
            cortex: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a semantic memory.
    #[must_use]
    pub fn with_cortex(mut self, cortex: Arc<dyn Cortex>) -> Self {
        self.cortex = Some(cortex);
        self
    }

    /// Look up a persona by worker name.
    #[must_use]
    pub fn persona(&self, name: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.name == name)
    }

    /// Persona names in evaluation (priority) order.
    #[must_use]
    pub fn persona_names(&self) -> Vec<&str> {
        self.personas.iter().map(|p| p.name.as_str()).collect()
    }

    /// Route a task to a worker name.
    ///
    /// Cache hits return immediately; otherwise semantic recall is
    /// tried, then keyword rules, and the computed route is cached
    /// under the verbatim task string before returning.
    #[instrument(skip(self), fields(task_len = task.len()))]
    pub async fn route(&self, task: &str) -> AgentRoute {
        if let Some(cached) = self.cache.read().await.get(task) {
            debug!(agent = %cached.target_agent, "route served from cache");
            return cached.clone();
        }

        let route = match self.semantic_route(task).await {
            Some(route) => route,
            None => {
                let route = self.keyword_route(task);
                self.remember(task, &route).await;
                route
            }
        };

        debug!(
            agent = %route.target_agent,
            confidence = route.confidence,
            "route computed"
        );
        self.cache
            .write()
            .await
            .insert(task.to_string(), route.clone());
        route
    }

    /// Try the cortex. Any failure or unmappable recall is a miss.
    async fn semantic_route(&self, task: &str) -> Option<AgentRoute> {
        let cortex = self.cortex.as_ref()?;
        let recalled = match cortex.recall(task).await {
            Ok(Some(recalled)) => recalled,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "cortex recall failed, falling back to keyword routing");
                return None;
            }
        };

        let persona = self.persona_for_skills(&recalled.selected_skills)?;
        let mut skills: Vec<&str> = recalled.selected_skills.iter().map(String::as_str).collect();
        skills.sort_unstable();
        Some(AgentRoute::new(
            persona.name.clone(),
            recalled.confidence,
            format!(
                "Semantic memory matched a similar task (recalled skills: [{}])",
                skills.join(", ")
            ),
        ))
    }

    /// Map a recalled skill set back to a persona by overlap size;
    /// ties go to the higher-priority persona.
    fn persona_for_skills(&self, skills: &[String]) -> Option<&Persona> {
        let mut best: Option<(&Persona, usize)> = None;
        for persona in &self.personas {
            let overlap = skills
                .iter()
                .filter(|s| persona.skills.contains(s.as_str()))
                .count();
            if overlap > 0 && best.map_or(true, |(_, n)| overlap > n) {
                best = Some((persona, overlap));
            }
        }
        best.map(|(persona, _)| persona)
    }

    /// Evaluate keyword rules against the lowercased task text in
    /// descending persona priority order.
    fn keyword_route(&self, task: &str) -> AgentRoute {
        let task_lower = task.to_lowercase();
        for persona in &self.personas {
            let mut matched: Vec<&str> = persona
                .keywords
                .iter()
                .filter(|k| task_lower.contains(k.as_str()))
                .map(String::as_str)
                .collect();
            if matched.is_empty() {
                continue;
            }
            matched.sort_unstable();
            let confidence = (KEYWORD_BASE_CONFIDENCE
                + KEYWORD_MATCH_BONUS * (matched.len() - 1) as f32)
                .min(0.9);
            return AgentRoute::new(
                persona.name.clone(),
                confidence,
                format!(
                    "Task text matched {} keywords: [{}]",
                    persona.name,
                    matched.join(", ")
                ),
            );
        }

        AgentRoute::new(
            self.default_persona.clone(),
            DEFAULT_ROUTE_CONFIDENCE,
            format!(
                "No specific keywords found; routing to the default {} worker",
                self.default_persona
            ),
        )
    }

    /// Best-effort write-back of a freshly computed route.
    async fn remember(&self, task: &str, route: &AgentRoute) {
        let Some(cortex) = self.cortex.as_ref() else {
            return;
        };
        let mut skills: Vec<String> = self
            .persona(&route.target_agent)
            .map(|p| p.skills.iter().cloned().collect())
            .unwrap_or_default();
        skills.sort();
        let decision = RoutingDecision::new(skills, route.reasoning.clone(), route.confidence);
        if let Err(e) = cortex.learn(task, &decision).await {
            debug!(error = %e, "cortex learn failed, decision not persisted");
        }
    }

    /// Build the plain task-brief map handed to the resolved worker.
    ///
    /// Contains `task_description`, `target_agent` and the persona's
    /// `allowed_skills`, plus any `relevant_files` the caller supplied.
    #[must_use]
    pub fn create_task_brief(
        &self,
        query: &str,
        target_agent: &str,
        context: &TaskContext,
    ) -> TaskContext {
        let mut brief = TaskContext::new();
        brief.insert(
            context_keys::TASK_DESCRIPTION.to_string(),
            Value::from(query),
        );
        brief.insert(
            context_keys::TARGET_AGENT.to_string(),
            Value::from(target_agent),
        );
        let mut skills: Vec<String> = self
            .persona(target_agent)
            .map(|p| p.skills.iter().cloned().collect())
            .unwrap_or_default();
        skills.sort();
        brief.insert(context_keys::ALLOWED_SKILLS.to_string(), Value::from(skills));
        if let Some(files) = context.get(context_keys::RELEVANT_FILES) {
            brief.insert(context_keys::RELEVANT_FILES.to_string(), files.clone());
        }
        brief
    }

    /// Empty the query cache, forcing re-evaluation of every task.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Number of cached routes.
    pub async fn cached_routes(&self) -> usize {
        self.cache.read().await.len()
    }
}

impl Default for HiveRouter {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED_ROUTER: OnceLock<Arc<HiveRouter>> = OnceLock::new();

/// Process-wide router instance.
///
/// Prefer constructing a [`HiveRouter`] and passing it explicitly; this
/// accessor exists for hosts that want exactly one shared instance.
/// Repeated calls return the identical router.
pub fn shared_router() -> Arc<HiveRouter> {
    SHARED_ROUTER
        .get_or_init(|| Arc::new(HiveRouter::new()))
        .clone()
}

/// Extract a leading `@agent` mention from an input.
///
/// Returns the lowercased mention and the remaining text.
#[must_use]
pub fn extract_mention(input: &str) -> Option<(String, String)> {
    let captures = MENTION_REGEX.captures(input)?;
    let mention = captures.get(1)?.as_str().to_lowercase();
    let rest = input[captures.get(0)?.end()..].trim().to_string();
    Some((mention, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use waggle_cortex::{InMemoryCortex, RecalledDecision};

    mock! {
        pub Cortex {}

        #[async_trait]
        impl Cortex for Cortex {
            async fn recall(
                &self,
                query: &str,
            ) -> waggle_cortex::Result<Option<RecalledDecision>>;

            async fn learn(
                &self,
                query: &str,
                decision: &RoutingDecision,
            ) -> waggle_cortex::Result<()>;
        }
    }

    #[tokio::test]
    async fn test_coding_keywords_route_to_coder() {
        let router = HiveRouter::new();
        for task in [
            "write a parser for the config format",
            "implement pagination",
            "refactor the session module",
        ] {
            let route = router.route(task).await;
            assert_eq!(route.target_agent, "coder", "task: {task}");
            assert!(route.reasoning.contains("coder"), "task: {task}");
        }
    }

    #[tokio::test]
    async fn test_review_keywords_route_to_reviewer() {
        let router = HiveRouter::new();
        for task in ["commit the changes", "run the test suite", "git log please"] {
            let route = router.route(task).await;
            assert_eq!(route.target_agent, "reviewer", "task: {task}");
        }
    }

    #[tokio::test]
    async fn test_review_keywords_override_coding_keywords() {
        let router = HiveRouter::new();
        let route = router.route("Write tests and commit").await;
        assert_eq!(route.target_agent, "reviewer");
        assert!(route.reasoning.contains("reviewer"));
    }

    #[tokio::test]
    async fn test_no_keywords_route_to_default() {
        let router = HiveRouter::new();
        let route = router.route("summarize yesterday's standup").await;
        assert_eq!(route.target_agent, "orchestrator");
        assert!(route.reasoning.contains("No specific keywords"));
        assert_eq!(route.confidence, DEFAULT_ROUTE_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_route_is_cached_by_verbatim_task_string() {
        let router = HiveRouter::new();
        let first = router.route("implement the cache").await;
        let second = router.route("implement the cache").await;
        assert_eq!(first, second);
        assert_eq!(router.cached_routes().await, 1);

        // A textually different string is cached independently.
        router.route("implement the cache!").await;
        assert_eq!(router.cached_routes().await, 2);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_the_cortex() {
        let mut cortex = MockCortex::new();
        cortex
            .expect_recall()
            .withf(|query| query == "implement the cache")
            .times(1)
            .returning(|_| Ok(None));
        cortex.expect_learn().times(1).returning(|_, _| Ok(()));

        let router = HiveRouter::new().with_cortex(Arc::new(cortex));
        let first = router.route("implement the cache").await;
        let second = router.route("implement the cache").await;
        assert_eq!(first, second);
        assert_eq!(first.target_agent, "coder");
    }

    #[tokio::test]
    async fn test_cortex_miss_falls_back_to_keywords() {
        let mut cortex = MockCortex::new();
        cortex
            .expect_recall()
            .withf(|query| query == "random query")
            .times(1)
            .returning(|_| Ok(None));
        cortex.expect_learn().times(1).returning(|_, _| Ok(()));

        let router = HiveRouter::new().with_cortex(Arc::new(cortex));
        let route = router.route("random query").await;
        assert_eq!(route.target_agent, "orchestrator");
    }

    #[tokio::test]
    async fn test_cortex_error_is_treated_as_a_miss() {
        let mut cortex = MockCortex::new();
        cortex
            .expect_recall()
            .times(1)
            .returning(|_| Err(waggle_cortex::Error::Unavailable("offline".to_string())));
        cortex.expect_learn().times(1).returning(|_, _| Ok(()));

        let router = HiveRouter::new().with_cortex(Arc::new(cortex));
        let route = router.route("implement retries").await;
        assert_eq!(route.target_agent, "coder");
    }

    #[tokio::test]
    async fn test_recalled_skills_map_to_reviewer() {
        let mut cortex = MockCortex::new();
        cortex.expect_recall().times(1).returning(|_| {
            Ok(Some(RecalledDecision {
                selected_skills: vec!["git".to_string(), "testing".to_string()],
                confidence: 0.85,
                reasoning: None,
            }))
        });
        // Semantic hits are not re-learned.
        cortex.expect_learn().never();

        let router = HiveRouter::new().with_cortex(Arc::new(cortex));
        let route = router.route("git operations").await;
        assert_eq!(route.target_agent, "reviewer");
        assert_eq!(route.confidence, 0.85);
        assert!(route.reasoning.contains("Semantic memory"));
    }

    #[tokio::test]
    async fn test_recall_with_unknown_skills_falls_back() {
        let mut cortex = MockCortex::new();
        cortex.expect_recall().times(1).returning(|_| {
            Ok(Some(RecalledDecision {
                selected_skills: vec!["juggling".to_string()],
                confidence: 0.9,
                reasoning: None,
            }))
        });
        cortex.expect_learn().times(1).returning(|_, _| Ok(()));

        let router = HiveRouter::new().with_cortex(Arc::new(cortex));
        let route = router.route("implement the parser").await;
        assert_eq!(route.target_agent, "coder");
    }

    #[tokio::test]
    async fn test_learned_routes_are_recalled_after_cache_clear() {
        let cortex = Arc::new(InMemoryCortex::new());
        let router = HiveRouter::new().with_cortex(cortex.clone());

        let keyword_route = router.route("implement the exporter").await;
        assert!(keyword_route.reasoning.contains("keywords"));

        router.clear_cache().await;
        let semantic_route = router.route("implement the exporter").await;
        assert_eq!(semantic_route.target_agent, "coder");
        assert!(semantic_route.reasoning.contains("Semantic memory"));
    }

    #[tokio::test]
    async fn test_clear_cache_forces_reevaluation() {
        let router = HiveRouter::new();
        router.route("implement the cache").await;
        assert_eq!(router.cached_routes().await, 1);

        router.clear_cache().await;
        assert_eq!(router.cached_routes().await, 0);
    }

    #[tokio::test]
    async fn test_multiple_keyword_matches_raise_confidence() {
        let router = HiveRouter::new();
        let single = router.route("implement the widget").await;
        let double = router.route("write and implement the widget").await;
        assert!(double.confidence > single.confidence);
        assert!(double.confidence <= 0.9);
    }

    #[test]
    fn test_persona_for_skills_overlap_wins() {
        let router = HiveRouter::new();
        let persona = router
            .persona_for_skills(&["git".to_string(), "code".to_string(), "testing".to_string()])
            .unwrap();
        // Two reviewer skills beat one coder skill.
        assert_eq!(persona.name, "reviewer");
    }

    #[test]
    fn test_persona_for_skills_tie_goes_to_priority() {
        let router = HiveRouter::new();
        let persona = router
            .persona_for_skills(&["git".to_string(), "code".to_string()])
            .unwrap();
        assert_eq!(persona.name, "reviewer");
    }

    #[test]
    fn test_create_task_brief() {
        let router = HiveRouter::new();
        let mut context = TaskContext::new();
        context.insert(
            context_keys::RELEVANT_FILES.to_string(),
            serde_json::json!(["src/lib.rs"]),
        );

        let brief = router.create_task_brief("fix the bug", "coder", &context);
        assert_eq!(
            brief.get(context_keys::TASK_DESCRIPTION),
            Some(&serde_json::json!("fix the bug"))
        );
        assert_eq!(
            brief.get(context_keys::TARGET_AGENT),
            Some(&serde_json::json!("coder"))
        );
        assert_eq!(
            brief.get(context_keys::ALLOWED_SKILLS),
            Some(&serde_json::json!(["code", "editor", "refactor"]))
        );
        assert_eq!(
            brief.get(context_keys::RELEVANT_FILES),
            Some(&serde_json::json!(["src/lib.rs"]))
        );
    }

    #[test]
    fn test_shared_router_is_one_instance() {
        let first = shared_router();
        let second = shared_router();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_extract_mention() {
        let (name, rest) = extract_mention("@Reviewer check the branch").unwrap();
        assert_eq!(name, "reviewer");
        assert_eq!(rest, "check the branch");

        assert!(extract_mention("no mention here").is_none());
        assert!(extract_mention("@trailing").is_none());
    }

    #[test]
    fn test_personas_evaluated_in_priority_order() {
        let router = HiveRouter::new();
        assert_eq!(
            router.persona_names(),
            vec!["reviewer", "coder", "researcher", "orchestrator"]
        );
    }
}
