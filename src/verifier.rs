//! Checks whether the packages of a component update were deployed.
use futures_util::future::try_join_all;
use log::*;

use crate::{error::Result, forge::traits::UrlProbe, planner::ArtifactPlanner};

pub struct DeploymentVerifier<P: UrlProbe> {
    planner: ArtifactPlanner,
    probe: P,
}

impl<P: UrlProbe> DeploymentVerifier<P> {
    pub fn new(planner: ArtifactPlanner, probe: P) -> Self {
        Self { planner, probe }
    }

    /// Return the planned URLs that answer 404, in planning order.
    ///
    /// All probes run concurrently; any probe failure fails the whole call.
    pub async fn find_missing(
        &self,
        package: &str,
        version: &str,
    ) -> Result<Vec<String>> {
        let urls = self.planner.plan_urls(
            package,
            version,
            self.planner.architectures(),
        );

        debug!("probing {} URLs for {package} {version}", urls.len());

        let results =
            try_join_all(urls.iter().map(|url| self.probe.returns_404(url)))
                .await?;

        let missing: Vec<String> = urls
            .into_iter()
            .zip(results)
            .filter_map(|(url, is_missing)| is_missing.then_some(url))
            .collect();

        for url in missing.iter() {
            warn!("not deployed: {url}");
        }

        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ComponentUpdateError, forge::traits::MockUrlProbe};
    use std::time::Duration;

    #[test_log::test(tokio::test)]
    async fn reports_only_missing_urls_in_planning_order() {
        let mut probe = MockUrlProbe::new();
        probe
            .expect_returns_404()
            .times(4)
            .returning(|url| Ok(url.contains("mingw-w64-")));

        let verifier =
            DeploymentVerifier::new(ArtifactPlanner::default(), probe);

        let missing = verifier.find_missing("curl", "8.4.0").await.unwrap();

        assert_eq!(
            missing,
            vec![
                "https://wingit.blob.core.windows.net/i686/mingw-w64-i686-curl-8.4.0-1-any.pkg.tar.xz",
                "https://wingit.blob.core.windows.net/x86-64/mingw-w64-x86_64-curl-8.4.0-1-any.pkg.tar.xz",
            ]
        );
    }

    #[tokio::test]
    async fn mintty_probes_epoch_versions() {
        let mut probe = MockUrlProbe::new();
        probe
            .expect_returns_404()
            .withf(|url| url.contains("mintty-1~3.6.1-1-"))
            .times(2)
            .returning(|_| Ok(false));

        let verifier =
            DeploymentVerifier::new(ArtifactPlanner::default(), probe);

        let missing = verifier.find_missing("mintty", "3.6.1").await.unwrap();

        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn msys2_runtime_probes_single_architecture() {
        let mut probe = MockUrlProbe::new();
        probe
            .expect_returns_404()
            .withf(|url| url.ends_with("msys2-runtime-3.4.6-1-x86_64.pkg.tar.xz"))
            .times(1)
            .returning(|_| Ok(true));

        let verifier =
            DeploymentVerifier::new(ArtifactPlanner::default(), probe);

        let missing =
            verifier.find_missing("msys2-runtime", "3.4.6").await.unwrap();

        assert_eq!(missing.len(), 1);
    }

    #[tokio::test]
    async fn unexpected_probe_status_fails_the_call() {
        let mut probe = MockUrlProbe::new();
        probe.expect_returns_404().returning(|url| {
            if url.contains("i686") {
                Err(ComponentUpdateError::Probe {
                    url: url.to_string(),
                    status: 500,
                })
            } else {
                Ok(true)
            }
        });

        let verifier =
            DeploymentVerifier::new(ArtifactPlanner::default(), probe);

        let result = verifier.find_missing("bash", "5.2.21").await;

        assert!(matches!(
            result,
            Err(ComponentUpdateError::Probe { status: 500, .. })
        ));
    }

    /// Probe whose answers complete in reverse order of issue.
    struct SlowFirstProbe;

    #[async_trait::async_trait]
    impl UrlProbe for SlowFirstProbe {
        async fn returns_404(&self, url: &str) -> Result<bool> {
            if url.contains("i686") {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            Ok(true)
        }
    }

    #[tokio::test]
    async fn order_follows_plan_not_completion() {
        let verifier =
            DeploymentVerifier::new(ArtifactPlanner::default(), SlowFirstProbe);

        let missing = verifier.find_missing("bash", "5.2.21").await.unwrap();

        assert_eq!(missing.len(), 2);
        assert!(missing[0].contains("/i686/"));
        assert!(missing[1].contains("/x86-64/"));
    }
}
