use crate::{
    constant, interface, AccessGuard, Acceptance, Attribute, Component,
    ComponentContext, ComponentInfo, Container, ContextDefinition, Deferred,
    IntoFallible, IntoSingleton, IntoTransient, Qualified, Qualifier,
    Qualifiers, Reference, ResolutionError, ResolutionResult, Svc, Traversal,
    TypeArgument, WithInterface,
};
use downcast_rs::Downcast;
use proptest::prelude::*;
use std::{
    error::Error,
    fmt::{Display, Formatter},
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Barrier,
    },
    thread,
    time::Duration,
};

#[derive(Default)]
struct Svc1(pub i32);

struct Svc2 {
    pub dep1: Svc<Svc1>,
}

impl Svc2 {
    pub fn new(dep1: Svc<Svc1>) -> Self {
        Svc2 { dep1 }
    }
}

struct Svc3 {
    pub dep1: Svc<Svc1>,
    pub dep2: Svc<Svc2>,
}

impl Svc3 {
    pub fn new(dep1: Svc<Svc1>, dep2: Svc<Svc2>) -> Self {
        Svc3 { dep1, dep2 }
    }
}

#[derive(Default)]
struct Counter(AtomicUsize);

impl Counter {
    fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[test]
fn can_make_svc1() {
    let mut builder = Container::builder();
    builder.provide(Svc1::default.transient());

    let container = builder.build();
    let _component: Svc<Svc1> = container.get().unwrap();
}

#[test]
fn cant_make_svc1_when_no_provider() {
    let container = Container::builder().build();
    let svc: ResolutionResult<Svc<Svc1>> = container.get();
    match svc {
        Err(ResolutionError::Unresolvable { component })
            if component == ComponentInfo::of::<Svc1>() => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!(),
    }

    let svc: Option<Svc<Svc1>> = container.get().unwrap();
    assert!(svc.is_none(), "component should not have been created");
}

#[test]
fn can_make_svc3() {
    let mut builder = Container::builder();
    builder.provide(Svc1::default.singleton());
    builder.provide(Svc2::new.transient());
    builder.provide(Svc3::new.transient());

    let container = builder.build();
    let svc3: Svc<Svc3> = container.get().unwrap();
    assert!(Svc::ptr_eq(&svc3.dep1, &svc3.dep2.dep1));
}

#[test]
fn cant_make_svc3_when_no_provider_for_dependency() {
    let mut builder = Container::builder();
    builder.provide(Svc2::new.transient());
    builder.provide(Svc3::new.transient());

    let container = builder.build();
    match container.get::<Svc<Svc3>>() {
        Err(ResolutionError::MissingDependency {
            component,
            dependency,
        }) if component == ComponentInfo::of::<Svc3>()
            && dependency == ComponentInfo::of::<Svc1>() => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("component should not be able to be activated"),
    }
}

#[test]
fn missing_dependency_is_reported_by_its_consumer() {
    let mut builder = Container::builder();
    builder.provide(Svc2::new.transient());

    let container = builder.build();
    match container.get::<Svc<Svc2>>() {
        Err(ResolutionError::MissingDependency { component, .. })
            if component == ComponentInfo::of::<Svc2>() => {}
        other => panic!("expected a missing dependency, got {:?}", other.err()),
    }
}

/// A tuple element missing from the container is reported like a missing
/// plain request.
#[test]
fn missing_tuple_element_is_unresolvable() {
    let mut builder = Container::builder();
    builder.provide(Svc1::default.singleton());

    let container = builder.build();
    match container.get::<(Svc<Svc1>, Svc<u16>)>() {
        Err(ResolutionError::Unresolvable { component })
            if component == ComponentInfo::of::<u16>() => {}
        other => panic!("expected an unresolvable component, got {:?}", other.err()),
    }
}

#[test]
fn tuples_request_every_element() {
    let mut builder = Container::builder();
    builder.provide(Svc1::default.singleton());
    builder.provide(constant(7u8));

    let container = builder.build();
    let (svc1, value, missing): (Svc<Svc1>, Svc<u8>, Option<Svc<u16>>) =
        container.get().unwrap();
    assert_eq!(0, svc1.0);
    assert_eq!(7, *value);
    assert!(missing.is_none());
}

trait Named: Component {
    fn name(&self) -> String;
    fn echo(&self) -> String;
}

interface! {
    dyn Named {
        fn name(&self) -> String;
        fn echo(&self) -> String;
    }
}

struct Left {
    right: Svc<Right>,
}

impl Left {
    fn new(counter: Svc<Counter>, right: Svc<Right>) -> Self {
        counter.increment();
        Left { right }
    }
}

impl Named for Left {
    fn name(&self) -> String {
        "left".to_owned()
    }

    fn echo(&self) -> String {
        self.right.named.name()
    }
}

struct Right {
    named: Svc<dyn Named>,
}

impl Right {
    fn new(named: Svc<dyn Named>) -> Self {
        Right { named }
    }
}

/// A cycle through a forwardable interface is broken by a placeholder.
#[test]
fn interface_cycle_is_broken() {
    let mut builder = Container::builder();
    builder.provide(constant(Counter::default()));
    builder.provide(Left::new.singleton().with_interface::<dyn Named>());
    builder.provide(Right::new.singleton());

    let container = builder.build();
    let named: Svc<dyn Named> = container.get().unwrap();
    assert_eq!("left", named.name());
    assert_eq!("left", named.echo());

    let counter: Svc<Counter> = container.get().unwrap();
    assert_eq!(1, counter.count());
}

/// The placeholder does not create anything until it is used.
#[test]
fn placeholder_resolves_lazily() {
    let mut builder = Container::builder();
    builder.provide(constant(Counter::default()));
    builder.provide(Left::new.transient().with_interface::<dyn Named>());
    builder.provide(Right::new.transient());

    let container = builder.build();
    let counter: Svc<Counter> = container.get().unwrap();
    let named: Svc<dyn Named> = container.get().unwrap();
    assert_eq!(1, counter.count());

    assert_eq!("left", named.echo());
    assert_eq!(2, counter.count());

    assert_eq!("left", named.echo());
    assert_eq!(2, counter.count());
}

fn placeholder(named: &Svc<dyn Named>) -> &Deferred<dyn Named> {
    Downcast::as_any(&**named)
        .downcast_ref()
        .expect("expected a deferred placeholder")
}

struct Host {
    guest: Svc<Guest>,
}

impl Host {
    fn new(guest: Svc<Guest>) -> Self {
        Host { guest }
    }
}

impl Named for Host {
    fn name(&self) -> String {
        "host".to_owned()
    }

    fn echo(&self) -> String {
        self.guest.named.name()
    }
}

/// Tries its placeholder while it is being constructed.
struct Guest {
    named: Svc<dyn Named>,
    early: Option<ResolutionError>,
}

impl Guest {
    fn new(named: Svc<dyn Named>) -> Self {
        let early = placeholder(&named).get().err();
        Guest { named, early }
    }
}

/// A placeholder used before its component exists reports why, and still
/// works once the component has been created.
#[test]
fn early_placeholder_use_fails_then_recovers() {
    let mut builder = Container::builder();
    builder.provide(Host::new.singleton().with_interface::<dyn Named>());
    builder.provide(Guest::new.singleton());

    let container = builder.build();
    let named: Svc<dyn Named> = container.get().unwrap();
    let host = Downcast::as_any(&*named).downcast_ref::<Host>().unwrap();
    match &host.guest.early {
        Some(ResolutionError::ReentrantInstantiation { component })
            if *component == ComponentInfo::of::<Host>() => {}
        other => panic!("expected a reentrant instantiation, got {:?}", other),
    }

    assert!(!placeholder(&host.guest.named).is_resolved());
    assert_eq!("host", named.echo());
    assert!(placeholder(&host.guest.named).is_resolved());
}

/// Placeholders do not keep their container alive.
#[test]
fn placeholders_do_not_keep_the_container_alive() {
    let mut builder = Container::builder();
    builder.provide(Host::new.singleton().with_interface::<dyn Named>());
    builder.provide(Guest::new.singleton());

    let container = builder.build();
    let named: Svc<dyn Named> = container.get().unwrap();
    drop(container);

    let host = Downcast::as_any(&*named).downcast_ref::<Host>().unwrap();
    assert!(matches!(
        placeholder(&host.guest.named).get(),
        Err(ResolutionError::ContainerDropped { component })
            if component == ComponentInfo::of::<dyn Named>()
    ));
}

struct Waiter {
    guest: Svc<Impatient>,
}

impl Waiter {
    fn new(guest: Svc<Impatient>) -> Self {
        Waiter { guest }
    }
}

impl Named for Waiter {
    fn name(&self) -> String {
        "waiter".to_owned()
    }

    fn echo(&self) -> String {
        self.guest.named.name()
    }
}

/// Calls through its placeholder during its first construction.
struct Impatient {
    named: Svc<dyn Named>,
}

impl Impatient {
    fn new(counter: Svc<Counter>, named: Svc<dyn Named>) -> Self {
        if counter.increment() == 1 {
            named.name();
        }

        Impatient { named }
    }
}

/// A constructor that panics on an early placeholder call leaves nothing
/// half created, so the next request succeeds from any thread.
#[test]
fn panicking_constructor_releases_its_components() {
    let mut builder = Container::builder();
    builder.provide(constant(Counter::default()));
    builder.provide(Waiter::new.singleton().with_interface::<dyn Named>());
    builder.provide(Impatient::new.singleton());

    let container = builder.build();
    let first = panic::catch_unwind(AssertUnwindSafe(|| {
        container.get::<Svc<dyn Named>>()
    }));
    assert!(first.is_err());

    let named = {
        let container = container.clone();
        thread::spawn(move || container.get::<Svc<dyn Named>>().unwrap())
    }
    .join()
    .unwrap();
    assert_eq!("waiter", named.echo());

    let counter: Svc<Counter> = container.get().unwrap();
    assert_eq!(2, counter.count());
}

struct Head(#[allow(dead_code)] Svc<Tail>);
struct Tail(#[allow(dead_code)] Svc<Head>);

/// A cycle through concrete types cannot be broken.
#[test]
fn concrete_cycle_is_an_error() {
    let mut builder = Container::builder();
    builder.provide(Head.singleton());
    builder.provide(Tail.singleton());

    let container = builder.build();
    match container.get::<Svc<Head>>() {
        Err(ResolutionError::CircularReference(cycle)) => {
            let head = ComponentInfo::of::<Head>();
            let tail = ComponentInfo::of::<Tail>();
            assert_eq!(head, cycle.origin());
            assert_eq!(&[head, tail, head], cycle.path());
        }
        other => panic!("expected a circular reference, got {:?}", other.err()),
    }
}

/// Interfaces without forwarding methods cannot break cycles either.
#[test]
fn cycle_through_opaque_interface_is_an_error() {
    trait Opaque: Component {}
    interface!(dyn Opaque);

    struct Inner(#[allow(dead_code)] Svc<dyn Opaque>);
    struct Outer(#[allow(dead_code)] Svc<Inner>);
    impl Opaque for Outer {}

    let mut builder = Container::builder();
    builder.provide(Outer.singleton().with_interface::<dyn Opaque>());
    builder.provide(Inner.singleton());

    let container = builder.build();
    let result = container.get::<Svc<dyn Opaque>>();
    assert!(matches!(
        result,
        Err(ResolutionError::CircularReference(_))
    ));
}

/// Failed traversals leave the path as they found it.
#[test]
fn traversal_path_is_restored_after_failure() {
    let mut builder = Container::builder();
    builder.provide(Head.singleton());
    builder.provide(Tail.singleton());

    let container = builder.build();
    let mut traversal = container.traversal();
    let mut definition = ContextDefinition::new();
    let result = traversal.follow(&mut definition, &Reference::of::<Head>());

    assert!(result.is_err());
    assert_eq!(0, traversal.depth());
    assert!(traversal.path().is_empty());
}

struct Alpha;
struct Beta;

impl Named for Alpha {
    fn name(&self) -> String {
        "alpha".to_owned()
    }

    fn echo(&self) -> String {
        self.name()
    }
}

impl Named for Beta {
    fn name(&self) -> String {
        "beta".to_owned()
    }

    fn echo(&self) -> String {
        self.name()
    }
}

/// Interfaces with several bindings can only be requested as a group.
#[test]
fn multiple_bindings_resolve_as_group() {
    let mut builder = Container::builder();
    builder.provide((|| Beta).singleton().with_interface::<dyn Named>());
    builder.provide((|| Alpha).singleton().with_interface::<dyn Named>());

    let container = builder.build();
    match container.get::<Svc<dyn Named>>() {
        Err(ResolutionError::MultipleBindings { component })
            if component == ComponentInfo::of::<dyn Named>() => {}
        other => panic!("expected multiple bindings, got {:?}", other.err()),
    }

    let all: Vec<Svc<dyn Named>> = container.get().unwrap();
    let names: Vec<_> = all.iter().map(|named| named.name()).collect();
    assert_eq!(vec!["beta", "alpha"], names);

    let none: Vec<Svc<Svc1>> = container.get().unwrap();
    assert!(none.is_empty());
}

struct Lookup {
    denied_during_construction: bool,
    guard: AccessGuard<Container>,
}

/// The container can only be used once the component has been created.
#[test]
fn container_access_is_guarded_until_wired() {
    let mut builder = Container::builder();
    builder.provide(Svc1::default.singleton());
    builder.provide(
        (|guard: AccessGuard<Container>| Lookup {
            denied_during_construction: matches!(
                guard.access(),
                Err(ResolutionError::AccessDenied { .. })
            ),
            guard,
        })
        .transient(),
    );

    let container = builder.build();
    let lookup: Svc<Lookup> = container.get().unwrap();
    assert!(lookup.denied_during_construction);

    let container = lookup.guard.access().unwrap();
    let _svc1: Svc<Svc1> = container.get().unwrap();
}

#[derive(Debug)]
struct Broken;

impl Error for Broken {}

impl Display for Broken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "broken")
    }
}

/// A failed activation is cached like any other result.
#[test]
fn activation_failure_is_cached() {
    let mut builder = Container::builder();
    builder.provide(constant(Counter::default()));
    builder.provide(
        (|counter: Svc<Counter>| -> Result<Svc1, Broken> {
            counter.increment();
            Err(Broken)
        })
        .fallible()
        .singleton(),
    );

    let container = builder.build();
    for _ in 0..2 {
        match container.get::<Svc<Svc1>>() {
            Err(ResolutionError::ActivationFailed { component, inner })
                if component == ComponentInfo::of::<Svc1>() =>
            {
                assert_eq!("broken", inner.to_string());
            }
            other => panic!("expected an activation failure, got {:?}", other.err()),
        }
    }

    let counter: Svc<Counter> = container.get().unwrap();
    assert_eq!(1, counter.count());
}

/// Concurrent requests for a singleton create it exactly once.
#[test]
fn concurrent_requests_share_one_instance() {
    const THREADS: usize = 8;

    let mut builder = Container::builder();
    builder.provide(constant(Counter::default()));
    builder.provide(
        (|counter: Svc<Counter>| {
            counter.increment();
            thread::sleep(Duration::from_millis(20));
            Svc1(1)
        })
        .singleton(),
    );

    let container = builder.build();
    let barrier = Svc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.get::<Svc<Svc1>>().unwrap()
            })
        })
        .collect();

    let instances: Vec<Svc<Svc1>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(instances
        .iter()
        .all(|instance| Svc::ptr_eq(instance, &instances[0])));

    let counter: Svc<Counter> = container.get().unwrap();
    assert_eq!(1, counter.count());
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct TagX(&'static str);
impl Qualifier for TagX {}

struct One;
impl Qualifiers for One {
    fn attributes() -> Vec<Attribute> {
        vec![Attribute::new(TagX("1"))]
    }
}

struct Two;
impl Qualifiers for Two {
    fn attributes() -> Vec<Attribute> {
        vec![Attribute::new(TagX("2"))]
    }
}

struct Tagged(ComponentContext);

struct Siblings {
    one: Svc<Tagged>,
    two: Svc<Tagged>,
}

fn tagged_container() -> Container {
    let mut builder = Container::builder();
    builder.provide(Tagged.singleton().accepts::<TagX>());
    builder.provide(
        (|one: Qualified<Svc<Tagged>, One>, two: Qualified<Svc<Tagged>, Two>| Siblings {
            one: one.into_inner(),
            two: two.into_inner(),
        })
        .transient(),
    );
    builder.build()
}

/// A context with one accepted attribute contains exactly that attribute.
#[test]
fn accepted_attribute_forms_context() {
    let mut definition = ContextDefinition::new();
    definition
        .expand([Attribute::new(TagX("v1"))])
        .accept(&Acceptance::new().accept::<TagX>());

    let context = definition.create();
    assert_eq!(Some(&TagX("v1")), context.qualifier::<TagX>());
    assert_eq!(1, context.kinds().count());
}

/// Siblings narrowed to different contexts get different instances, and
/// each context keeps its instance.
#[test]
fn qualified_siblings_are_cached_per_context() {
    let container = tagged_container();

    let first: Svc<Siblings> = container.get().unwrap();
    assert!(!Svc::ptr_eq(&first.one, &first.two));
    assert_eq!(Some(&TagX("1")), first.one.0.qualifier::<TagX>());
    assert_eq!(Some(&TagX("2")), first.two.0.qualifier::<TagX>());

    let second: Svc<Siblings> = container.get().unwrap();
    assert!(Svc::ptr_eq(&first.one, &second.one));
    assert!(Svc::ptr_eq(&first.two, &second.two));

    let direct: Qualified<Svc<Tagged>, One> = container.get().unwrap();
    assert!(Svc::ptr_eq(&first.one, &direct));
}

/// Attributes a component does not accept never reach its context.
#[test]
fn unaccepted_attributes_are_invisible() {
    let mut builder = Container::builder();
    builder.provide(Tagged.singleton());

    let container = builder.build();
    let tagged: Qualified<Svc<Tagged>, One> = container.get().unwrap();
    let plain: Svc<Tagged> = container.get().unwrap();
    assert!(tagged.0.is_empty());
    assert!(Svc::ptr_eq(&tagged, &plain));
}

struct Holder(Svc<Tagged>);

/// A consumer is cached per attribute its dependencies accept.
#[test]
fn dependency_attributes_propagate_to_consumer() {
    let mut builder = Container::builder();
    builder.provide(Tagged.singleton().accepts::<TagX>());
    builder.provide(Holder.singleton());

    let container = builder.build();
    let one: Qualified<Svc<Holder>, One> = container.get().unwrap();
    let two: Qualified<Svc<Holder>, Two> = container.get().unwrap();
    let again: Qualified<Svc<Holder>, One> = container.get().unwrap();

    assert!(!Svc::ptr_eq(&one, &two));
    assert!(Svc::ptr_eq(&one, &again));
    assert_eq!(Some(&TagX("1")), one.0 .0.qualifier::<TagX>());
}

/// Root qualifiers apply to every request of the container.
#[test]
fn root_qualifiers_apply_to_requests() {
    let mut builder = Container::builder();
    builder.provide(Tagged.singleton().accepts::<TagX>());
    builder.root_qualifier(TagX("root"));

    let container = builder.build();
    let tagged: Svc<Tagged> = container.get().unwrap();
    assert_eq!(Some(&TagX("root")), tagged.0.qualifier::<TagX>());

    let mut definition = ContextDefinition::new();
    definition.expand([Attribute::new(TagX("custom"))]);
    let custom: Svc<Tagged> = container.get_in(definition).unwrap();
    assert_eq!(Some(&TagX("custom")), custom.0.qualifier::<TagX>());
}

struct User;
struct Repository(ComponentContext);
struct Service(Svc<Repository>);

struct OfUser;
impl Qualifiers for OfUser {
    fn attributes() -> Vec<Attribute> {
        Vec::new()
    }

    fn type_arguments() -> Option<Vec<TypeArgument>> {
        Some(vec![TypeArgument::of::<User>()])
    }
}

struct Forwarded;
impl Qualifiers for Forwarded {
    fn attributes() -> Vec<Attribute> {
        Vec::new()
    }

    fn type_arguments() -> Option<Vec<TypeArgument>> {
        Some(vec![TypeArgument::Variable(0)])
    }
}

/// Typed components see the reference they were requested through,
/// including arguments forwarded from their consumer.
#[test]
fn type_arguments_are_forwarded() {
    let mut builder = Container::builder();
    builder.provide(Repository.singleton().typed());
    builder.provide(
        (|repository: Qualified<Svc<Repository>, Forwarded>| Service(repository.into_inner()))
            .singleton(),
    );

    let container = builder.build();
    let service: Qualified<Svc<Service>, OfUser> = container.get().unwrap();
    let reference = service.0 .0.reference().unwrap();
    assert_eq!(ComponentInfo::of::<Repository>(), reference.component());
    assert_eq!(&[ComponentInfo::of::<User>()], reference.arguments());

    match container.get::<Qualified<Svc<Repository>, Forwarded>>() {
        Err(ResolutionError::UnresolvedTypeVariable { index: 0, .. }) => {}
        other => panic!("expected an unresolved variable, got {:?}", other.err()),
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Kind(u8);
impl Qualifier for Kind {}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Flavor(u8);
impl Qualifier for Flavor {}

fn attribute(kind: bool, value: u8) -> Attribute {
    if kind {
        Attribute::new(Kind(value))
    } else {
        Attribute::new(Flavor(value))
    }
}

proptest! {
    /// Only defined kinds are ever active, and only accepted kinds reach
    /// the created context.
    #[test]
    fn active_kinds_are_defined(
        parent in prop::collection::vec((any::<bool>(), 0u8..4), 0..6),
        children in prop::collection::vec(
            prop::collection::vec((any::<bool>(), 0u8..4), 0..4),
            0..4,
        ),
        accept_kind in any::<bool>(),
        accept_flavor in any::<bool>(),
    ) {
        let mut acceptance = Acceptance::new();
        if accept_kind {
            acceptance = acceptance.accept::<Kind>();
        }
        if accept_flavor {
            acceptance = acceptance.accept::<Flavor>();
        }

        let mut definition = ContextDefinition::new();
        definition.expand(parent.iter().map(|&(kind, value)| attribute(kind, value)));
        definition.accept(&acceptance);

        let children: Vec<ContextDefinition> = children
            .iter()
            .map(|attributes| {
                let mut child = definition.clone();
                child.expand(attributes.iter().map(|&(kind, value)| attribute(kind, value)));
                child.accept(&Acceptance::new().accept::<Kind>().accept::<Flavor>());
                child
            })
            .collect();
        definition.collect(&children);

        let defined: Vec<_> = definition.defined_kinds().collect();
        for kind in definition.active_kinds() {
            prop_assert!(defined.contains(&kind));
        }

        let context = definition.create();
        for kind in context.kinds() {
            prop_assert!(defined.contains(&kind));
        }
    }

    /// Following a reference leaves the traversal at the depth it started
    /// at, whether or not resolution succeeds.
    #[test]
    fn follow_restores_depth(
        bind_head in any::<bool>(),
        bind_tail in any::<bool>(),
        bind_svc2 in any::<bool>(),
        bind_svc1 in any::<bool>(),
    ) {
        let mut builder = Container::builder();
        if bind_head {
            builder.provide(Head.singleton());
        }
        if bind_tail {
            builder.provide(Tail.singleton());
        }
        if bind_svc2 {
            builder.provide(Svc2::new.transient());
        }
        if bind_svc1 {
            builder.provide(Svc1::default.singleton());
        }

        let container = builder.build();
        let mut traversal = container.traversal();
        for reference in [
            Reference::of::<Head>(),
            Reference::of::<Svc2>(),
            Reference::of::<dyn Named>().into_group(),
        ] {
            let mut definition = ContextDefinition::new();
            let _ = traversal.follow(&mut definition, &reference);
            prop_assert_eq!(0, traversal.depth());
        }
    }
}
