use std::marker::PhantomData;

pub trait Stage<In, Out> {
    fn process<C>(&mut self, data: In, collector: &mut C)
    where
        C: OutputCollector<Out>;
}

pub trait OutputCollector<T> {
    fn push(&mut self, item: T);
}

impl<T, F> OutputCollector<T> for F
where
    F: FnMut(T),
{
    #[inline(always)]
    fn push(&mut self, item: T) {
        (self)(item);
    }
}

impl<F, In, Out> Stage<In, Out> for F
where
    F: FnMut(In) -> Option<Out>,
{
    #[inline(always)]
    fn process<C>(&mut self, data: In, collector: &mut C)
    where
        C: OutputCollector<Out>,
    {
        // Execute the closure and pass the result downstream
        let out = (self)(data);
        if let Some(out) = out {
            collector.push(out);
        }
    }
}

pub struct Pipeline<S1, S2, In, Mid, Out> {
    s1: S1,
    s2: S2,
    _phantom: PhantomData<(In, Mid, Out)>,
}

impl<In, Mid, Out, S1, S2> Stage<In, Out> for Pipeline<S1, S2, In, Mid, Out>
where
    S1: Stage<In, Mid>,
    S2: Stage<Mid, Out>,
{
    #[inline(always)]
    fn process<C>(&mut self, data: In, collector: &mut C)
    where
        C: OutputCollector<Out>,
    {
        self.s1.process(data, &mut |mid| {
            self.s2.process(mid, collector);
        });
    }
}

pub trait StageExt<In, Mid>: Stage<In, Mid> {
    #[inline(always)]
    fn pipe<Out, S2: Stage<Mid, Out>>(self, s2: S2) -> Pipeline<Self, S2, In, Mid, Out>
    where
        Self: Sized,
    {
        Pipeline {
            s1: self,
            s2,
            _phantom: PhantomData,
        }
    }

    /// Runs every item of `input` through the stage and gathers the output.
    fn run_all<I>(&mut self, input: I) -> Vec<Mid>
    where
        I: IntoIterator<Item = In>,
    {
        let mut out = Vec::new();
        for item in input {
            self.process(item, &mut |x: Mid| out.push(x));
        }
        out
    }
}

impl<S, In, Mid> StageExt<In, Mid> for S where S: Stage<In, Mid> {}

#[macro_export]
macro_rules! pipe {
    ($s1:expr) => { $s1 };
    ($s1:expr, $($rest:expr),+ $(,)?) => {
        {
            use $crate::StageExt;
            $s1.pipe($crate::pipe!($($rest),+))
        }
    };
}
