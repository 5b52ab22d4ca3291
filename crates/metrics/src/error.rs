use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not create metric `{name}`, error: {source}"))]
    CreateCollector { name: &'static str, source: prometheus::Error },

    #[snafu(display("Could not register metric collector, error: {source}"))]
    RegisterCollector { source: prometheus::Error },

    #[snafu(display("Error occurs while binding metrics server, error: {source}"))]
    BindMetricsServer { source: std::io::Error },

    #[snafu(display("Error occurs while serving metrics server, error: {source}"))]
    ServeMetricsServer { source: std::io::Error },
}
