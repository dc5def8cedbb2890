// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory K8s client for tests.
//!
//! `MockK8sClient` keeps pods and services in maps keyed by namespace and
//! name, enforces name uniqueness the way the API server does, counts every
//! call, and can be told to fail specific operations.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use crate::client::K8sClient;
use crate::error::K8sError;
use crate::types::{Namespace, ObjectMeta, Pod, PodStatus, ResourceKind, Service};

/// Operations exposed by [`K8sClient`], used for call counting and failure
/// injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	CreatePod,
	CreateService,
	DeletePod,
	GetPod,
	GetService,
	ListPods,
	ListServices,
	GetNamespace,
}

#[derive(Debug, Clone)]
enum Failure {
	Once(K8sError),
	Always(K8sError),
}

type ObjectKey = (String, String);

#[derive(Debug, Default)]
struct State {
	pods: BTreeMap<ObjectKey, Pod>,
	services: BTreeMap<ObjectKey, Service>,
	namespaces: BTreeSet<String>,
	calls: HashMap<Operation, usize>,
	failures: HashMap<Operation, Failure>,
}

/// In-memory [`K8sClient`] with call counting and failure injection.
#[derive(Debug)]
pub struct MockK8sClient {
	state: Mutex<State>,
	next_uid: AtomicU64,
}

impl Default for MockK8sClient {
	fn default() -> Self {
		Self::new()
	}
}

impl MockK8sClient {
	/// Create a mock cluster containing only the `default` namespace.
	pub fn new() -> Self {
		let mut state = State::default();
		state.namespaces.insert("default".to_string());
		Self {
			state: Mutex::new(state),
			next_uid: AtomicU64::new(1),
		}
	}

	/// Add a namespace to the mock cluster.
	pub fn with_namespace(self, name: &str) -> Self {
		self.lock().namespaces.insert(name.to_string());
		self
	}

	/// Make every subsequent call to `op` fail with `err`.
	pub fn fail_always(&self, op: Operation, err: K8sError) {
		self.lock().failures.insert(op, Failure::Always(err));
	}

	/// Make only the next call to `op` fail with `err`.
	pub fn fail_once(&self, op: Operation, err: K8sError) {
		self.lock().failures.insert(op, Failure::Once(err));
	}

	/// Remove any failure configured for `op`.
	pub fn clear_failure(&self, op: Operation) {
		self.lock().failures.remove(&op);
	}

	/// Number of times `op` has been called.
	pub fn calls(&self, op: Operation) -> usize {
		self.lock().calls.get(&op).copied().unwrap_or(0)
	}

	/// Number of calls across all operations.
	pub fn total_calls(&self) -> usize {
		self.lock().calls.values().sum()
	}

	/// Look up a stored pod without going through (or counting) the trait.
	pub fn pod(&self, namespace: &str, name: &str) -> Option<Pod> {
		self.lock().pods.get(&key(namespace, name)).cloned()
	}

	/// Look up a stored service without going through (or counting) the trait.
	pub fn service(&self, namespace: &str, name: &str) -> Option<Service> {
		self.lock().services.get(&key(namespace, name)).cloned()
	}

	/// Names of all pods stored in `namespace`.
	pub fn pod_names(&self, namespace: &str) -> Vec<String> {
		self
			.lock()
			.pods
			.keys()
			.filter(|(ns, _)| ns == namespace)
			.map(|(_, name)| name.clone())
			.collect()
	}

	/// Names of all services stored in `namespace`.
	pub fn service_names(&self, namespace: &str) -> Vec<String> {
		self
			.lock()
			.services
			.keys()
			.filter(|(ns, _)| ns == namespace)
			.map(|(_, name)| name.clone())
			.collect()
	}

	/// Store a pod directly, bypassing uniqueness checks and counters.
	///
	/// The pod keeps its own `creation_timestamp` when set, which lets tests
	/// seed objects of a given age.
	pub fn insert_pod(&self, namespace: &str, mut pod: Pod) {
		let name = pod.metadata.name.clone().unwrap_or_default();
		self.stamp(&mut pod.metadata, namespace, Utc::now());
		self.lock().pods.insert(key(namespace, &name), pod);
	}

	/// Store a service directly, bypassing uniqueness checks and counters.
	pub fn insert_service(&self, namespace: &str, mut service: Service) {
		let name = service.metadata.name.clone().unwrap_or_default();
		self.stamp(&mut service.metadata, namespace, Utc::now());
		self.lock().services.insert(key(namespace, &name), service);
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn stamp(&self, meta: &mut ObjectMeta, namespace: &str, now: DateTime<Utc>) {
		meta.namespace = Some(namespace.to_string());
		if meta.uid.is_none() {
			let uid = self.next_uid.fetch_add(1, Ordering::Relaxed);
			meta.uid = Some(format!("mock-uid-{uid}"));
		}
		if meta.creation_timestamp.is_none() {
			meta.creation_timestamp = Some(Time(now));
		}
	}

	/// Record a call to `op` and return the injected failure, if any.
	fn enter(&self, op: Operation) -> Result<(), K8sError> {
		let mut state = self.lock();
		*state.calls.entry(op).or_insert(0) += 1;
		match state.failures.get(&op).cloned() {
			Some(Failure::Always(err)) => Err(err),
			Some(Failure::Once(err)) => {
				state.failures.remove(&op);
				Err(err)
			}
			None => Ok(()),
		}
	}

	fn require_namespace(&self, namespace: &str) -> Result<(), K8sError> {
		if self.lock().namespaces.contains(namespace) {
			Ok(())
		} else {
			Err(K8sError::NamespaceNotFound {
				name: namespace.to_string(),
			})
		}
	}
}

fn key(namespace: &str, name: &str) -> ObjectKey {
	(namespace.to_string(), name.to_string())
}

/// Match an equality-based label selector (`k=v,k2=v2`) against labels.
fn matches_selector(labels: Option<&BTreeMap<String, String>>, selector: &str) -> bool {
	selector
		.split(',')
		.map(str::trim)
		.filter(|term| !term.is_empty())
		.all(|term| {
			let (k, v) = match term.split_once("==").or_else(|| term.split_once('=')) {
				Some(kv) => kv,
				None => return labels.is_some_and(|l| l.contains_key(term)),
			};
			labels.and_then(|l| l.get(k.trim())).map(String::as_str) == Some(v.trim())
		})
}

#[async_trait]
impl K8sClient for MockK8sClient {
	async fn create_pod(&self, namespace: &str, mut pod: Pod) -> Result<Pod, K8sError> {
		self.enter(Operation::CreatePod)?;
		self.require_namespace(namespace)?;
		let name = pod.metadata.name.clone().unwrap_or_default();
		let k = key(namespace, &name);
		let mut state = self.lock();
		if state.pods.contains_key(&k) {
			return Err(K8sError::AlreadyExists {
				kind: ResourceKind::Pod,
				name,
			});
		}
		pod.metadata.creation_timestamp = None;
		self.stamp(&mut pod.metadata, namespace, Utc::now());
		pod.status = Some(PodStatus {
			phase: Some("Pending".to_string()),
			..Default::default()
		});
		state.pods.insert(k, pod.clone());
		Ok(pod)
	}

	async fn create_service(
		&self,
		namespace: &str,
		mut service: Service,
	) -> Result<Service, K8sError> {
		self.enter(Operation::CreateService)?;
		self.require_namespace(namespace)?;
		let name = service.metadata.name.clone().unwrap_or_default();
		let k = key(namespace, &name);
		let mut state = self.lock();
		if state.services.contains_key(&k) {
			return Err(K8sError::AlreadyExists {
				kind: ResourceKind::Service,
				name,
			});
		}
		service.metadata.creation_timestamp = None;
		self.stamp(&mut service.metadata, namespace, Utc::now());
		state.services.insert(k, service.clone());
		Ok(service)
	}

	async fn delete_pod(
		&self,
		name: &str,
		namespace: &str,
		_grace_period_seconds: u32,
	) -> Result<(), K8sError> {
		self.enter(Operation::DeletePod)?;
		match self.lock().pods.remove(&key(namespace, name)) {
			Some(_) => Ok(()),
			None => Err(K8sError::NotFound {
				kind: ResourceKind::Pod,
				name: name.to_string(),
			}),
		}
	}

	async fn get_pod(&self, name: &str, namespace: &str) -> Result<Pod, K8sError> {
		self.enter(Operation::GetPod)?;
		self.pod(namespace, name).ok_or_else(|| K8sError::NotFound {
			kind: ResourceKind::Pod,
			name: name.to_string(),
		})
	}

	async fn get_service(&self, name: &str, namespace: &str) -> Result<Service, K8sError> {
		self.enter(Operation::GetService)?;
		self
			.service(namespace, name)
			.ok_or_else(|| K8sError::NotFound {
				kind: ResourceKind::Service,
				name: name.to_string(),
			})
	}

	async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, K8sError> {
		self.enter(Operation::ListPods)?;
		let state = self.lock();
		let pods = state
			.pods
			.iter()
			.filter(|((ns, _), pod)| {
				ns == namespace && matches_selector(pod.metadata.labels.as_ref(), label_selector)
			})
			.map(|(_, pod)| pod.clone())
			.collect();
		Ok(pods)
	}

	async fn list_services(
		&self,
		namespace: &str,
		label_selector: &str,
	) -> Result<Vec<Service>, K8sError> {
		self.enter(Operation::ListServices)?;
		let state = self.lock();
		let services = state
			.services
			.iter()
			.filter(|((ns, _), svc)| {
				ns == namespace && matches_selector(svc.metadata.labels.as_ref(), label_selector)
			})
			.map(|(_, svc)| svc.clone())
			.collect();
		Ok(services)
	}

	async fn get_namespace(&self, name: &str) -> Result<Namespace, K8sError> {
		self.enter(Operation::GetNamespace)?;
		self.require_namespace(name)?;
		Ok(Namespace {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				..Default::default()
			},
			..Default::default()
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn named_service(name: &str) -> Service {
		Service {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				..Default::default()
			},
			..Default::default()
		}
	}

	fn named_pod(name: &str, labels: &[(&str, &str)]) -> Pod {
		Pod {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				labels: Some(
					labels
						.iter()
						.map(|(k, v)| (k.to_string(), v.to_string()))
						.collect(),
				),
				..Default::default()
			},
			..Default::default()
		}
	}

	#[tokio::test]
	async fn create_pod_assigns_server_metadata() {
		let mock = MockK8sClient::new();
		let created = mock
			.create_pod("default", named_pod("demo", &[]))
			.await
			.unwrap();

		assert_eq!(created.metadata.namespace.as_deref(), Some("default"));
		assert!(created.metadata.uid.is_some());
		assert!(created.metadata.creation_timestamp.is_some());
		assert_eq!(mock.calls(Operation::CreatePod), 1);
	}

	#[tokio::test]
	async fn duplicate_pod_name_conflicts() {
		let mock = MockK8sClient::new();
		mock
			.create_pod("default", named_pod("demo", &[]))
			.await
			.unwrap();
		let err = mock
			.create_pod("default", named_pod("demo", &[]))
			.await
			.unwrap_err();

		assert!(err.is_already_exists());
	}

	#[tokio::test]
	async fn unknown_namespace_is_rejected() {
		let mock = MockK8sClient::new();
		let err = mock
			.create_pod("missing", named_pod("demo", &[]))
			.await
			.unwrap_err();
		assert_eq!(
			err,
			K8sError::NamespaceNotFound {
				name: "missing".to_string()
			}
		);
	}

	#[tokio::test]
	async fn registered_namespace_accepts_objects() {
		let mock = MockK8sClient::new().with_namespace("envd");
		assert!(mock.get_namespace("envd").await.is_ok());

		mock.create_pod("envd", named_pod("demo", &[])).await.unwrap();
		mock
			.create_service("envd", named_service("demo"))
			.await
			.unwrap();

		assert_eq!(mock.pod_names("envd"), vec!["demo".to_string()]);
		assert_eq!(mock.service_names("envd"), vec!["demo".to_string()]);
		assert!(mock.service_names("default").is_empty());
	}

	#[tokio::test]
	async fn clear_failure_restores_normal_behaviour() {
		let mock = MockK8sClient::new();
		mock.fail_always(
			Operation::GetNamespace,
			K8sError::Unavailable {
				message: "down".to_string(),
			},
		);
		assert!(mock.get_namespace("default").await.is_err());
		assert!(mock.get_namespace("default").await.is_err());

		mock.clear_failure(Operation::GetNamespace);
		assert!(mock.get_namespace("default").await.is_ok());
		assert_eq!(mock.calls(Operation::GetNamespace), 3);
	}

	#[tokio::test]
	async fn fail_once_applies_to_a_single_call() {
		let mock = MockK8sClient::new();
		mock.fail_once(Operation::CreatePod, K8sError::Timeout);

		assert_eq!(
			mock.create_pod("default", named_pod("a", &[])).await,
			Err(K8sError::Timeout)
		);
		assert!(mock.create_pod("default", named_pod("a", &[])).await.is_ok());
		assert_eq!(mock.calls(Operation::CreatePod), 2);
	}

	#[tokio::test]
	async fn list_pods_filters_by_selector() {
		let mock = MockK8sClient::new();
		mock.insert_pod("default", named_pod("a", &[("name", "a"), ("tier", "env")]));
		mock.insert_pod("default", named_pod("b", &[("name", "b")]));

		let pods = mock.list_pods("default", "tier=env").await.unwrap();
		assert_eq!(pods.len(), 1);
		assert_eq!(pods[0].metadata.name.as_deref(), Some("a"));

		let all = mock.list_pods("default", "").await.unwrap();
		assert_eq!(all.len(), 2);
	}

	#[test]
	fn selector_matching() {
		let labels: BTreeMap<String, String> = [("name", "demo"), ("managed", "true")]
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();

		assert!(matches_selector(Some(&labels), "name=demo"));
		assert!(matches_selector(Some(&labels), "name==demo,managed=true"));
		assert!(matches_selector(Some(&labels), "managed"));
		assert!(!matches_selector(Some(&labels), "name=other"));
		assert!(!matches_selector(None, "name=demo"));
		assert!(matches_selector(None, ""));
	}
}
