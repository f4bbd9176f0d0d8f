//! End-to-end tests: a real server on a socket, driven by `WavesClient`.

use std::net::SocketAddr;

use tempfile::TempDir;
use waves_model::{AiryModel, RaoSupport, ScalarWaveModel, StubModel};
use waves_server::{Listener, StatusCode, WavesClient, WavesServer, WavesServicer};

const DEMO_PARAMETERS: &str = "{Hs: 5, Tp: 15, gamma: 1.2, waves propagating to: 0, omega: [1, 2, 3]}";

async fn spawn_tcp<M>(model: M) -> SocketAddr
where
    M: ScalarWaveModel + Clone + 'static,
{
    let listener = Listener::bind_tcp("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind should succeed");
    let addr = match &listener {
        Listener::Tcp(listener) => listener.local_addr().unwrap(),
        Listener::Unix(_) => unreachable!(),
    };
    tokio::spawn(WavesServer::new(WavesServicer::new(model)).run(listener));
    addr
}

#[tokio::test]
async fn test_demo_scenario() {
    let addr = spawn_tcp(StubModel::new()).await;
    let mut client = WavesClient::connect(addr).await.unwrap();

    client.set_parameters(DEMO_PARAMETERS).await.unwrap();
    let z = client.elevations(&[(1.0, 2.0), (6.0, 5.0)], 3.0).await.unwrap();
    assert_eq!(z, vec![6.0, 14.0]);

    let velocities = client
        .orbital_velocities(&[(1.0, 2.0, 3.0), (4.0, 5.0, 6.0)], 0.0)
        .await
        .unwrap();
    assert_eq!(velocities.vx, vec![1.0, 4.0]);
    assert_eq!(velocities.vy, vec![2.0, 5.0]);
    assert_eq!(velocities.vz, vec![3.0, 6.0]);
}

#[tokio::test]
async fn test_errors_come_back_as_statuses() {
    let addr = spawn_tcp(StubModel::new()).await;
    let mut client = WavesClient::connect(addr).await.unwrap();

    let err = client.spectrum(0.0, 0.0, 0.0).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::Unimplemented));
    assert!(err.to_string().contains("spectrum is not implemented in this model."));

    let err = client
        .call::<_, serde_json::Value>(
            "elevations",
            &serde_json::json!({"x": [1.0, 2.0, 3.0], "y": [1.0, 2.0], "t": 0.0}),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::InvalidArgument));

    let err = client.set_parameters("{Hs: [").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::InvalidArgument));

    // The connection survives failed calls.
    assert_eq!(client.elevations(&[(0.0, 0.0)], 1.0).await.unwrap(), vec![1.0]);
}

#[tokio::test]
async fn test_failed_configuration_keeps_previous_model() {
    let addr = spawn_tcp(AiryModel::new()).await;
    let mut client = WavesClient::connect(addr).await.unwrap();

    client
        .set_parameters("{amplitude: 2, omega: 1, psi: 0, phase: 1.5707963267948966}")
        .await
        .unwrap();

    let err = client
        .set_parameters("{amplitud: 3, omega: 1, psi: 0}")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::InvalidArgument));
    assert!(
        err.to_string()
            .contains("Unable to find key 'amplitude' in the YAML. \nMaybe you meant: amplitud <-> amplitude?"),
        "{err}"
    );

    let z = client.elevations(&[(0.0, 0.0)], 0.0).await.unwrap();
    assert!((z[0] + 2.0).abs() < 1e-12, "{z:?}");

    assert_eq!(
        client.rao_support().await.unwrap(),
        RaoSupport {
            angular_frequencies: vec![1.0],
            directions: vec![0.0],
        }
    );
    let spectrum = client.spectrum(0.0, 0.0, 0.0).await.unwrap();
    assert_eq!(spectrum.si, vec![2.0]);
}

#[tokio::test]
async fn test_unix_socket() {
    let temp_dir = TempDir::new().expect("TempDir should create test directory");
    let socket_path = temp_dir.path().join("waves.sock");

    let listener = Listener::bind_unix(&socket_path).expect("bind should succeed");
    tokio::spawn(WavesServer::new(WavesServicer::new(StubModel::new())).run(listener));

    let mut client = WavesClient::connect_unix(&socket_path).await.unwrap();
    client.set_parameters("").await.unwrap();
    let pdyn = client
        .dynamic_pressures(&[(1.0, 1.0, 1.0), (2.0, 2.0, 2.0)], 1.0)
        .await
        .unwrap();
    assert_eq!(pdyn, vec![4.0, 7.0]);
}

#[tokio::test]
async fn test_concurrent_clients() {
    let addr = spawn_tcp(StubModel::new()).await;

    let mut tasks = Vec::new();
    for i in 0..8i32 {
        tasks.push(tokio::spawn(async move {
            let mut client = WavesClient::connect(addr).await.unwrap();
            let points: Vec<_> = (0..100i32).map(|j| (f64::from(i), f64::from(j))).collect();
            let z = client.elevations(&points, 0.5).await.unwrap();
            for (j, value) in z.iter().enumerate() {
                assert_eq!(*value, f64::from(i) + j as f64 + 0.5);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
}
